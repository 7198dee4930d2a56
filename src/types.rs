//! Common types for the dashboard
//!
//! Trade records as served by `/api/trades`. The engine only reads them.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// How a trade was executed
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    Otc,
    /// Any other venue (DEX aggregator path, ...)
    Other(String),
}

impl Route {
    pub fn as_str(&self) -> &str {
        match self {
            Route::Otc => "OTC",
            Route::Other(name) => name,
        }
    }

    pub fn is_otc(&self) -> bool {
        matches!(self, Route::Otc)
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Route {
    fn from(value: &str) -> Self {
        if value == "OTC" {
            Route::Otc
        } else {
            Route::Other(value.to_string())
        }
    }
}

impl Serialize for Route {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Route {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Route::from(raw.as_str()))
    }
}

/// A logged trade execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub id: u64,
    pub created_at: String,
    pub route: Route,
    pub input_token: String,
    pub output_token: String,
    #[serde(deserialize_with = "de_decimal")]
    pub input_amount: f64,
    #[serde(deserialize_with = "de_decimal")]
    pub price: f64,
    /// Percent
    #[serde(deserialize_with = "de_decimal")]
    pub slippage: f64,
    /// May be zero or negative for non-OTC routes
    #[serde(default, deserialize_with = "de_decimal")]
    pub cost_savings: f64,
    #[serde(default, deserialize_with = "de_opt_decimal", skip_serializing_if = "Option::is_none")]
    pub output_amount: Option<f64>,
    /// Aggregator slippage quoted for the same trade, for comparison
    #[serde(default, deserialize_with = "de_opt_decimal", skip_serializing_if = "Option::is_none")]
    pub jupiter_slippage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_time: Option<String>,
}

impl Trade {
    /// "USDC/ETH"
    pub fn pair(&self) -> String {
        format!("{}/{}", self.input_token, self.output_token)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDecimal {
    Number(f64),
    Text(String),
}

impl RawDecimal {
    fn into_f64<E: serde::de::Error>(self) -> std::result::Result<f64, E> {
        match self {
            RawDecimal::Number(n) => Ok(n),
            RawDecimal::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| E::custom(format!("invalid decimal: {s:?}"))),
        }
    }
}

/// Backend emits floats, fixtures and proxies emit numeric strings
fn de_decimal<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<f64, D::Error> {
    RawDecimal::deserialize(deserializer)?.into_f64()
}

fn de_opt_decimal<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<f64>, D::Error> {
    Option::<RawDecimal>::deserialize(deserializer)?
        .map(RawDecimal::into_f64)
        .transpose()
}
