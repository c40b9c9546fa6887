use serde::Deserialize;
use serde::Serialize;

use crate::models::unspent_output::UnspentOutput;
use crate::protocol::keys::PublicKey;

/// one member of a ring: either a decoy or the real output being spent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RingMember {
    pub global_index: u64,
    pub public_key: PublicKey,
    pub rct: Option<String>,
}

impl From<&UnspentOutput> for RingMember {
    fn from(output: &UnspentOutput) -> Self {
        Self {
            global_index: output.global_index,
            public_key: output.public_key,
            rct: output.rct.clone(),
        }
    }
}

/// decoys for one real output. never contains the real output itself.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DecoySet {
    members: Vec<RingMember>,
}

impl DecoySet {
    pub(crate) fn new(members: Vec<RingMember>) -> Self {
        Self { members }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn members(&self) -> &[RingMember] {
        &self.members
    }

    pub fn contains_global_index(&self, global_index: u64) -> bool {
        self.members.iter().any(|m| m.global_index == global_index)
    }
}

impl IntoIterator for DecoySet {
    type Item = RingMember;
    type IntoIter = std::vec::IntoIter<RingMember>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.into_iter()
    }
}
