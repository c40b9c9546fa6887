use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use strum::EnumIter;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Default, EnumIter)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Main net.
    #[default]
    Mainnet,

    /// Public test network with its own address prefixes.
    Testnet,

    /// Staging network that tracks mainnet rules ahead of hard forks.
    Stagenet,
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let string = match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
            Network::Stagenet => "stagenet",
        };
        write!(f, "{}", string)
    }
}

impl FromStr for Network {
    type Err = String;
    fn from_str(input: &str) -> Result<Network, Self::Err> {
        match input {
            "mainnet" | "main" => Ok(Network::Mainnet),
            "testnet" | "test" => Ok(Network::Testnet),
            "stagenet" | "stage" => Ok(Network::Stagenet),
            _ => Err(format!("Failed to parse {} as network", input)),
        }
    }
}
