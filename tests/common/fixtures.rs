use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use xmr_light_send::api::export::*;
use xmr_light_send::models::decoy_set::RingMember;
use xmr_light_send::protocol::fee::estimate_tx_size;
use xmr_light_send::protocol::keys::KeyImage;
use xmr_light_send::protocol::keys::PublicKey;
use xmr_light_send::protocol::keys::SecretKey;
use xmr_light_send::protocol::keys::TxHash;

pub const SENDER: &str = "4AliceLightWallet";
pub const RECIPIENT: &str = "4BobLightWallet";

fn key(seed: &str, salt: u8) -> [u8; 32] {
    let mut bytes = [salt; 32];
    for (i, b) in seed.bytes().enumerate() {
        bytes[i % 32] = bytes[i % 32].wrapping_mul(31).wrapping_add(b);
    }
    bytes
}

pub fn output(amount: Amount, global_index: u64, ringct: bool) -> UnspentOutput {
    let seed = format!("output-{global_index}");
    UnspentOutput {
        tx_hash: TxHash(key(&seed, 1)),
        tx_pub_key: PublicKey(key(&seed, 2)),
        index: 0,
        global_index,
        amount,
        public_key: PublicKey(key(&seed, 3)),
        rct: ringct.then(|| "ee".repeat(96)),
        height: 2_000_000 + global_index,
    }
}

pub fn decoy_pool(count: u64, first_global_index: u64) -> Vec<RingMember> {
    (first_global_index..first_global_index + count)
        .map(|i| RingMember::from(&output(Amount::from_piconero(0), i, true)))
        .collect()
}

pub fn sender_account() -> SenderAccount {
    SenderAccount {
        address: SENDER.to_owned(),
        public_keys: ViewSendKeys {
            view: PublicKey(key(SENDER, 1)),
            spend: PublicKey(key(SENDER, 2)),
        },
        secret_keys: SecretViewSendKeys {
            view: SecretKey::new([0x11; 32]),
            spend: SecretKey::new([0x22; 32]),
        },
    }
}

/// stand-in primitives: mainnet addresses start with `4`, signed size is the
/// estimate plus `extra_signed_bytes`.
#[derive(Debug, Default)]
pub struct TestCrypto {
    pub extra_signed_bytes: usize,
    pub signatures: AtomicUsize,
}

impl TestCrypto {
    pub fn signatures(&self) -> usize {
        self.signatures.load(Ordering::SeqCst)
    }
}

impl TxCryptography for TestCrypto {
    fn decode_address(&self, address: &str, network: Network) -> Result<DecodedAddress, CryptoError> {
        if network != Network::Mainnet || !address.starts_with('4') || address.len() < 2 {
            return Err(CryptoError(format!("{address} is not a {network} address")));
        }
        Ok(DecodedAddress {
            keys: ViewSendKeys {
                view: PublicKey(key(address, 1)),
                spend: PublicKey(key(address, 2)),
            },
            is_subaddress: false,
            integrated_payment_id: None,
        })
    }

    fn encrypt_payment_id(
        &self,
        payment_id: [u8; 8],
        view_public: &PublicKey,
        _tx_secret_key: &SecretKey,
    ) -> Result<[u8; 8], CryptoError> {
        let mut encrypted = payment_id;
        for (b, k) in encrypted.iter_mut().zip(view_public.as_bytes()) {
            *b ^= k;
        }
        Ok(encrypted)
    }

    fn generate_key_image(
        &self,
        output: &UnspentOutput,
        _public_keys: &ViewSendKeys,
        secret_keys: &SecretViewSendKeys,
    ) -> Result<KeyImage, CryptoError> {
        let mut image = *output.public_key.as_bytes();
        for (b, s) in image.iter_mut().zip(secret_keys.spend.as_bytes()) {
            *b ^= s;
        }
        Ok(KeyImage(image))
    }

    fn generate_tx_secret_key(&self) -> SecretKey {
        SecretKey::new(rand::random())
    }

    fn sign_transaction(
        &self,
        unsigned: &UnsignedTransaction,
        _secret_keys: &SecretViewSendKeys,
    ) -> Result<SignedTransaction, CryptoError> {
        let n = self.signatures.fetch_add(1, Ordering::SeqCst) as u8;
        let size = estimate_tx_size(
            unsigned.sources.len(),
            unsigned.mixin,
            unsigned.destinations.len(),
            unsigned.ringct,
        ) + self.extra_signed_bytes;
        let mut hash = *unsigned.tx_secret_key.as_bytes();
        hash[0] = n.wrapping_add(1);
        Ok(SignedTransaction {
            tx_hash: TxHash(hash),
            tx_key: unsigned.tx_secret_key.clone(),
            serialized: vec![0x02; size],
        })
    }
}

pub fn initiator(gateway: Arc<MemoryGateway>, crypto: Arc<TestCrypto>, config: SendConfig) -> TransactionInitiator {
    TransactionInitiator::new(gateway, crypto, config, sender_account())
}
