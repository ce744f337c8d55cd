use std::fmt;
use std::str::FromStr;

use bip39::{Language, Mnemonic};
use bitcoin::bip32::{DerivationPath, Xpriv};
use bitcoin::secp256k1::Secp256k1;
use bitcoin::{Address, Network, PrivateKey, PublicKey};

use crate::config::WalletConfig;
use crate::error::WalletError;
use crate::mnemonic::Phrase;
use crate::Result;

/// The single keypair and P2PKH address a phrase controls
#[derive(Clone)]
pub struct KeyMaterial {
    pub address: Address,
    pub private_key: PrivateKey,
    pub public_key: PublicKey,
}

impl KeyMaterial {
    /// Derive key material from a phrase using the configured network and path
    pub fn derive(phrase: &Phrase, config: &WalletConfig) -> Result<Self> {
        Self::derive_at(phrase, config.network, &config.derivation_path)
    }

    /// Phrase -> BIP39 seed (empty passphrase) -> BIP32 key at `path` -> P2PKH
    pub fn derive_at(phrase: &Phrase, network: Network, path: &str) -> Result<Self> {
        let mnemonic = Mnemonic::parse_in_normalized(Language::English, &phrase.to_string())
            .map_err(|e| WalletError::KeyDerivation(format!("Invalid mnemonic: {}", e)))?;
        let seed = mnemonic.to_seed("");

        let secp = Secp256k1::new();
        let master_key = Xpriv::new_master(network, &seed)
            .map_err(|e| WalletError::KeyDerivation(e.to_string()))?;

        let path = DerivationPath::from_str(path)
            .map_err(|e| WalletError::KeyDerivation(e.to_string()))?;

        let derived_key = master_key
            .derive_priv(&secp, &path)
            .map_err(|e| WalletError::KeyDerivation(e.to_string()))?;

        let private_key = PrivateKey::new(derived_key.private_key, network);
        let public_key = PublicKey::from_private_key(&secp, &private_key);
        let address = Address::p2pkh(public_key, network);

        log::debug!("Derived address {} at {}", address, path);

        Ok(Self {
            address,
            private_key,
            public_key,
        })
    }

    pub fn to_wif(&self) -> String {
        self.private_key.to_wif()
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("address", &self.address)
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

/// Parse a destination address and require it to belong to `network`
pub fn parse_address(address: &str, network: Network) -> Result<Address> {
    Address::from_str(address.trim())
        .map_err(|e| WalletError::InvalidAddress(format!("{}: {}", address, e)))?
        .require_network(network)
        .map_err(|e| WalletError::InvalidAddress(format!("Address network mismatch: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mnemonic::english_wordlist;

    fn abandon_about() -> Phrase {
        Phrase::from_words(&["abandon"; 11], english_wordlist()).unwrap()
    }

    #[test]
    fn test_bip44_mainnet_address_vector() {
        // Well-known first BIP44 receive address for "abandon ... about"
        let keys = KeyMaterial::derive(&abandon_about(), &WalletConfig::new(true)).unwrap();
        assert_eq!(
            keys.address.to_string(),
            "1LqBGSKuX5yYUonjxT5qGfpUsXKYYWeabA"
        );
    }

    #[test]
    fn test_testnet_address_uses_testnet_prefix() {
        let keys = KeyMaterial::derive(&abandon_about(), &WalletConfig::new(false)).unwrap();
        let address = keys.address.to_string();
        assert!(address.starts_with('m') || address.starts_with('n'));
        assert!(keys.to_wif().starts_with('c'));
    }

    #[test]
    fn test_same_key_on_both_networks() {
        let main = KeyMaterial::derive(&abandon_about(), &WalletConfig::new(true)).unwrap();
        let test = KeyMaterial::derive(&abandon_about(), &WalletConfig::new(false)).unwrap();
        assert_eq!(main.public_key, test.public_key);
    }

    #[test]
    fn test_invalid_path_is_key_derivation_error() {
        let result = KeyMaterial::derive_at(&abandon_about(), Network::Testnet, "m/not/a/path");
        assert!(matches!(result, Err(WalletError::KeyDerivation(_))));
    }

    #[test]
    fn test_parse_address_checks_network() {
        assert!(parse_address("1LqBGSKuX5yYUonjxT5qGfpUsXKYYWeabA", Network::Bitcoin).is_ok());
        assert!(matches!(
            parse_address("1LqBGSKuX5yYUonjxT5qGfpUsXKYYWeabA", Network::Testnet),
            Err(WalletError::InvalidAddress(_))
        ));
        assert!(matches!(
            parse_address("not-an-address", Network::Bitcoin),
            Err(WalletError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_debug_hides_private_key() {
        let keys = KeyMaterial::derive(&abandon_about(), &WalletConfig::new(false)).unwrap();
        let debug = format!("{:?}", keys);
        assert!(!debug.contains(&keys.to_wif()));
    }
}
