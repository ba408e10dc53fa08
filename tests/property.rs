use passvault::crypto::{Argon2Params, PassphraseCipher, VaultCipher};
use passvault::password::{PasswordGenerator, StrengthPolicy};
use passvault::vault::{AccountStore, NewAccount, PasswordChoice, SecretBuffer, VaultCodec};
use proptest::prelude::*;

proptest! {
    #[test]
    fn codec_preserves_every_account(
        entries in proptest::collection::btree_map(
            "[A-Za-z0-9 ._-]{1,24}",
            ("[a-z]{16,40}", proptest::option::of("[a-z@.]{1,16}")),
            0..8,
        )
    ) {
        let mut store = AccountStore::new();
        for (name, (tail, username)) in &entries {
            if name.trim().is_empty() {
                continue;
            }
            let password = format!("Aa1!{tail}");
            let mut account = NewAccount::new(PasswordChoice::UserSupplied(SecretBuffer::new(&password)));
            account.username = username.clone();
            store.add(name, account).unwrap();
        }

        let encoded = VaultCodec::encode(&store).unwrap();
        let decoded = VaultCodec::decode(&encoded).unwrap();

        prop_assert_eq!(decoded.list(), store.list());
        for meta in store.list() {
            prop_assert_eq!(decoded.get(&meta.name).unwrap(), store.get(&meta.name).unwrap());
            prop_assert_eq!(
                decoded.get_password(&meta.name).unwrap(),
                store.get_password(&meta.name).unwrap()
            );
        }
    }

    #[test]
    fn decode_never_panics(data in proptest::collection::vec(any::<u8>(), 0..512)) {
        let _ = VaultCodec::decode(&data);
    }

    #[test]
    fn open_rejects_arbitrary_bytes(data in proptest::collection::vec(any::<u8>(), 0..256)) {
        let cipher = PassphraseCipher::new(Argon2Params::minimum());
        prop_assert!(cipher.open(&data, &SecretBuffer::new("pw")).is_err());
    }

    #[test]
    fn generated_passwords_always_pass_the_policy(length in 20usize..64) {
        let policy = StrengthPolicy::default();
        let generator = PasswordGenerator::new(policy, length, 1000);
        let password = generator.generate().unwrap();
        prop_assert_eq!(password.expose().chars().count(), length);
        prop_assert!(policy.evaluate(password.expose()).is_pass());
    }
}
