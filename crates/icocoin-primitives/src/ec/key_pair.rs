//! Key pairs and Wallet Import Format.
//!
//! A `KeyPair` bundles a public key with an optional private key, the
//! serialization form used when hashing or exporting the public key, and the
//! network it belongs to. Pairs imported from a bare public key cannot sign.

use crate::base58;
use crate::ec::private_key::{PrivateKey, PRIVATE_KEY_LEN};
use crate::ec::public_key::{PublicKey, COMPRESSED_LEN};
use crate::ec::signature::Signature;
use crate::network::Network;
use crate::PrimitivesError;

/// Trailing WIF byte marking a compressed public key.
const COMPRESS_FLAG: u8 = 0x01;

/// A secp256k1 key pair bound to a network.
#[derive(Clone, Debug)]
pub struct KeyPair {
    private_key: Option<PrivateKey>,
    public_key: PublicKey,
    compressed: bool,
    network: Network,
}

impl KeyPair {
    /// Generate a fresh compressed key pair.
    pub fn generate(network: Network) -> Self {
        Self::from_private_key(PrivateKey::new(), true, network)
    }

    /// Wrap an existing private key.
    pub fn from_private_key(private_key: PrivateKey, compressed: bool, network: Network) -> Self {
        let public_key = private_key.pub_key();
        KeyPair {
            private_key: Some(private_key),
            public_key,
            compressed,
            network,
        }
    }

    /// Build a public-only pair from a SEC1 encoding.
    ///
    /// The compression flag follows the encoding that was passed in.
    pub fn from_public_key(bytes: &[u8], network: Network) -> Result<Self, PrimitivesError> {
        let public_key = PublicKey::from_bytes(bytes)?;
        Ok(KeyPair {
            private_key: None,
            public_key,
            compressed: bytes.len() == COMPRESSED_LEN,
            network,
        })
    }

    /// Import a WIF string for one network.
    ///
    /// # Arguments
    /// * `wif` - The Base58Check string.
    /// * `network` - Network whose WIF version byte must match.
    ///
    /// # Returns
    /// The key pair, or `InvalidNetworkVersion`, `InvalidWifLength`,
    /// `InvalidCompressionFlag`, or a Base58Check error.
    pub fn from_wif(wif: &str, network: &Network) -> Result<Self, PrimitivesError> {
        let (version, payload) = base58::check_decode(wif)?;
        if version != network.wif {
            tracing::debug!(version, expected = network.wif, "WIF network mismatch");
            return Err(PrimitivesError::InvalidNetworkVersion(version));
        }
        Self::from_wif_payload(&payload, *network)
    }

    /// Import a WIF string, accepting any of `networks`.
    ///
    /// The first network whose WIF version byte matches is used.
    pub fn from_wif_any(wif: &str, networks: &[Network]) -> Result<Self, PrimitivesError> {
        let (version, payload) = base58::check_decode(wif)?;
        let network = networks
            .iter()
            .find(|n| n.wif == version)
            .ok_or_else(|| {
                tracing::debug!(version, "WIF version matches no allowed network");
                PrimitivesError::InvalidNetworkVersion(version)
            })?;
        Self::from_wif_payload(&payload, *network)
    }

    fn from_wif_payload(payload: &[u8], network: Network) -> Result<Self, PrimitivesError> {
        let compressed = match payload.len() {
            PRIVATE_KEY_LEN => false,
            len if len == PRIVATE_KEY_LEN + 1 => {
                let flag = payload[PRIVATE_KEY_LEN];
                if flag != COMPRESS_FLAG {
                    tracing::debug!(flag, "bad WIF compression flag");
                    return Err(PrimitivesError::InvalidCompressionFlag(flag));
                }
                true
            }
            len => return Err(PrimitivesError::InvalidWifLength(len)),
        };
        let private_key = PrivateKey::from_bytes(&payload[..PRIVATE_KEY_LEN])?;
        Ok(Self::from_private_key(private_key, compressed, network))
    }

    /// Export the private key as WIF for this pair's network.
    ///
    /// # Returns
    /// The WIF string, or `MissingPrivateKey` for a public-only pair.
    pub fn to_wif(&self) -> Result<String, PrimitivesError> {
        let private_key = self
            .private_key
            .as_ref()
            .ok_or(PrimitivesError::MissingPrivateKey)?;
        let mut payload = Vec::with_capacity(PRIVATE_KEY_LEN + 1);
        payload.extend_from_slice(&private_key.to_bytes());
        if self.compressed {
            payload.push(COMPRESS_FLAG);
        }
        Ok(base58::check_encode(self.network.wif, &payload))
    }

    /// Sign a 32-byte digest.
    ///
    /// Fails with `MissingPrivateKey` before any curve arithmetic when the
    /// pair is public-only.
    pub fn sign(&self, digest: &[u8; 32]) -> Result<Signature, PrimitivesError> {
        match &self.private_key {
            Some(key) => key.sign(digest),
            None => Err(PrimitivesError::MissingPrivateKey),
        }
    }

    pub fn verify(&self, digest: &[u8; 32], signature: &Signature) -> bool {
        self.public_key.verify(digest, signature)
    }

    /// Public key in this pair's serialization form.
    pub fn public_key_bytes(&self) -> Vec<u8> {
        self.public_key.to_bytes(self.compressed)
    }

    /// Hash160 of [`public_key_bytes`](Self::public_key_bytes).
    pub fn pub_key_hash(&self) -> [u8; 20] {
        self.public_key.hash160(self.compressed)
    }

    pub fn private_key(&self) -> Option<&PrivateKey> {
        self.private_key.as_ref()
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn is_compressed(&self) -> bool {
        self.compressed
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn can_sign(&self) -> bool {
        self.private_key.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::sha256d;

    const ALICE_WIF: &str = "cScfkGjbzzoeewVWmU2hYPUHeVGJRDdFt7WhmrVVGkxpmPP8BHWe";

    #[test]
    fn test_wif_vectors() {
        struct Case {
            wif: &'static str,
            network: Network,
            d: &'static str,
            compressed: bool,
            pub_key_hash: &'static str,
        }

        let cases = [
            Case {
                wif: "5Kd3NBUAdUnhyzenEwVLy9pBKxSwXvE9FMPyR4UKZvpe6E3AgLr",
                network: Network::ICOCOIN,
                d: "eddbdc1168f1daeadbd3e44c1e3f8f5a284c2029f78ad26af98583a499de5b19",
                compressed: false,
                pub_key_hash: "7bb7888b1e6e195d9a54cf66bd05948c3cbf0561",
            },
            Case {
                wif: "Kz6UJmQACJmLtaQj5A3JAge4kVTNQ8gbvXuwbmCj7bsaabudb3RD",
                network: Network::ICOCOIN,
                d: "55c9bccb9ed68446d1b75273bbce89d7fe013a8acd1625514420fb2aca1a21c4",
                compressed: true,
                pub_key_hash: "106af710d5b9a4b23e8113469dda9c7088d60ff1",
            },
            Case {
                wif: ALICE_WIF,
                network: Network::TESTNET,
                d: "9632f11629d05bbb9a3aef95d330b3fab6630d8133bed3efe0cc8b19191c53a9",
                compressed: true,
                pub_key_hash: "75d715f9a84555e752772c9ad62be90b3b7bb88a",
            },
        ];

        for case in &cases {
            let pair = KeyPair::from_wif(case.wif, &case.network).unwrap();
            assert_eq!(pair.private_key().unwrap().to_hex(), case.d, "{}", case.wif);
            assert_eq!(pair.is_compressed(), case.compressed, "{}", case.wif);
            assert_eq!(hex::encode(pair.pub_key_hash()), case.pub_key_hash, "{}", case.wif);
            assert_eq!(pair.to_wif().unwrap(), case.wif);
        }
    }

    #[test]
    fn test_public_key_bytes_follow_compression() {
        let pair = KeyPair::from_wif(ALICE_WIF, &Network::TESTNET).unwrap();
        assert_eq!(
            hex::encode(pair.public_key_bytes()),
            "038ea27103fb646a2cea9eca9080737e0b23640caaaef2853416c9b286b353313e"
        );

        let uncompressed = KeyPair::from_wif(
            "5Kd3NBUAdUnhyzenEwVLy9pBKxSwXvE9FMPyR4UKZvpe6E3AgLr",
            &Network::ICOCOIN,
        )
        .unwrap();
        assert_eq!(uncompressed.public_key_bytes().len(), 65);
    }

    #[test]
    fn test_wrong_network_version() {
        let err = KeyPair::from_wif(ALICE_WIF, &Network::ICOCOIN).unwrap_err();
        assert!(matches!(err, PrimitivesError::InvalidNetworkVersion(0xef)));
        assert_eq!(err.kind(), crate::ErrorKind::Validation);
    }

    #[test]
    fn test_from_wif_any() {
        let nets = [Network::ICOCOIN, Network::TESTNET];
        let pair = KeyPair::from_wif_any(ALICE_WIF, &nets).unwrap();
        assert_eq!(*pair.network(), Network::TESTNET);

        assert!(matches!(
            KeyPair::from_wif_any(ALICE_WIF, &[Network::ICOCOIN]),
            Err(PrimitivesError::InvalidNetworkVersion(0xef))
        ));
    }

    #[test]
    fn test_bad_compression_flag() {
        let mut payload = vec![0x11; 32];
        payload.push(0x02);
        let wif = base58::check_encode(Network::ICOCOIN.wif, &payload);
        assert!(matches!(
            KeyPair::from_wif(&wif, &Network::ICOCOIN),
            Err(PrimitivesError::InvalidCompressionFlag(0x02))
        ));
    }

    #[test]
    fn test_bad_wif_length() {
        for len in [0usize, 31, 34] {
            let wif = base58::check_encode(Network::ICOCOIN.wif, &vec![0x11; len]);
            assert!(matches!(
                KeyPair::from_wif(&wif, &Network::ICOCOIN),
                Err(PrimitivesError::InvalidWifLength(l)) if l == len
            ));
        }
    }

    #[test]
    fn test_wif_scalar_out_of_range() {
        let wif = base58::check_encode(Network::ICOCOIN.wif, &[0u8; 32]);
        assert!(matches!(
            KeyPair::from_wif(&wif, &Network::ICOCOIN),
            Err(PrimitivesError::InvalidPrivateKey(_))
        ));
    }

    #[test]
    fn test_public_only_pair() {
        let full = KeyPair::from_wif(ALICE_WIF, &Network::TESTNET).unwrap();
        let public = KeyPair::from_public_key(&full.public_key_bytes(), Network::TESTNET).unwrap();

        assert!(!public.can_sign());
        assert!(public.is_compressed());
        assert_eq!(public.pub_key_hash(), full.pub_key_hash());
        assert!(matches!(public.to_wif(), Err(PrimitivesError::MissingPrivateKey)));

        let digest = sha256d(b"spend");
        assert!(matches!(
            public.sign(&digest),
            Err(PrimitivesError::MissingPrivateKey)
        ));

        let sig = full.sign(&digest).unwrap();
        assert!(public.verify(&digest, &sig));
    }

    #[test]
    fn test_generate_roundtrips_through_wif() {
        let pair = KeyPair::generate(Network::ICOCOIN);
        assert!(pair.is_compressed());
        let wif = pair.to_wif().unwrap();
        let back = KeyPair::from_wif(&wif, &Network::ICOCOIN).unwrap();
        assert_eq!(back.private_key(), pair.private_key());
        assert_eq!(back.public_key(), pair.public_key());
    }
}
