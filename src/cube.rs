use serde::Deserialize;

/// One `<Cube currency='USD' rate='1.0742'/>` entry.
#[derive(Debug, Deserialize, PartialEq)]
pub struct RateCube {
    #[serde(rename = "@currency", default)]
    pub currency: Option<String>,
    #[serde(rename = "@rate", default)]
    pub rate: Option<String>,
}

/// `<Cube time='2023-01-10'>` holding the day's rates.
#[derive(Debug, Deserialize, PartialEq)]
pub struct DatedCube {
    #[serde(rename = "@time", default)]
    pub time: Option<String>,
    #[serde(rename = "Cube", default)]
    pub rates: Vec<RateCube>,
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct OuterCube {
    #[serde(rename = "Cube", default)]
    pub days: Vec<DatedCube>,
}

/// The `gesmes:Envelope` root. Sender and subject elements are ignored.
#[derive(Debug, Deserialize, PartialEq)]
pub struct Envelope {
    #[serde(rename = "Cube", default)]
    pub cube: Option<OuterCube>,
}

impl Envelope {
    /// The first day cube carrying a `time` attribute.
    pub fn into_dated(self) -> Option<DatedCube> {
        self.cube?.days.into_iter().find(|day| day.time.is_some())
    }
}
