//! End-to-end KEM tests
//!
//! keygen → encapsulate → decapsulate recovers the message and both sides
//! agree on the shared secret; keys and ciphertexts survive a trip through
//! their byte layouts on disk.

use std::fs;

use frodo_lwe::kem::{decapsulate, encapsulate, keygen, shared_secret, Ciphertext, PublicKey, SecretKey};
use frodo_lwe::params::FrodoParams;
use frodo_lwe::LweError;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

#[test]
fn test_kem_reference_1000_trials() {
    let params = FrodoParams::reference();
    let mut rng = ChaCha20Rng::seed_from_u64(1000);

    for trial in 0..1000 {
        let (pk, sk) = keygen(&params, &mut rng).unwrap();
        let (ct, ss, mu) = encapsulate(&params, &pk, None, &mut rng).unwrap();
        let (mu2, ss2) = decapsulate(&params, &pk, &sk, &ct).unwrap();
        assert_eq!(mu, mu2, "trial {} message mismatch", trial);
        assert_eq!(ss, ss2, "trial {} shared secret mismatch", trial);
    }
}

#[test]
fn test_kem_all_presets() {
    let mut rng = ChaCha20Rng::seed_from_u64(7);
    for name in ["reference", "primal-demo", "attack-demo", "weak-prime"] {
        let params = FrodoParams::preset(name).unwrap();
        let (pk, sk) = keygen(&params, &mut rng).unwrap();
        for _ in 0..10 {
            let (ct, ss, mu) = encapsulate(&params, &pk, None, &mut rng).unwrap();
            let (mu2, ss2) = decapsulate(&params, &pk, &sk, &ct).unwrap();
            assert_eq!(mu, mu2, "{} message mismatch", name);
            assert_eq!(ss, ss2, "{} shared secret mismatch", name);
        }
    }
}

#[test]
fn test_short_message_padded() {
    let params = FrodoParams::reference();
    let mut rng = ChaCha20Rng::seed_from_u64(8);
    let (pk, sk) = keygen(&params, &mut rng).unwrap();

    let (ct, _, mu) = encapsulate(&params, &pk, Some(&b"hello"[..]), &mut rng).unwrap();
    assert_eq!(mu.len(), params.message_bytes);
    assert_eq!(&mu[..5], b"hello");
    assert!(mu[5..].iter().all(|&b| b == 0));

    let (mu2, _) = decapsulate(&params, &pk, &sk, &ct).unwrap();
    assert_eq!(mu2, mu);
}

#[test]
fn test_message_too_long() {
    let params = FrodoParams::reference();
    let mut rng = ChaCha20Rng::seed_from_u64(9);
    let (pk, _) = keygen(&params, &mut rng).unwrap();

    let long = vec![0xAAu8; params.message_bytes + 1];
    let err = encapsulate(&params, &pk, Some(&long[..]), &mut rng).unwrap_err();
    assert!(matches!(err, LweError::MessageTooLong { len: 17, max: 16 }));
}

#[test]
fn test_wrong_secret_key_disagrees() {
    let params = FrodoParams::reference();
    let mut rng = ChaCha20Rng::seed_from_u64(10);
    let (pk, _) = keygen(&params, &mut rng).unwrap();
    let (_, other_sk) = keygen(&params, &mut rng).unwrap();

    let (ct, ss, _) = encapsulate(&params, &pk, None, &mut rng).unwrap();
    let (_, ss2) = decapsulate(&params, &pk, &other_sk, &ct).unwrap();
    assert_ne!(ss, ss2);
}

#[test]
fn test_shared_secret_binds_ciphertext() {
    let params = FrodoParams::reference();
    let mut rng = ChaCha20Rng::seed_from_u64(11);
    let (pk, _) = keygen(&params, &mut rng).unwrap();
    let (ct, ss, mu) = encapsulate(&params, &pk, None, &mut rng).unwrap();

    let mut tampered = ct.clone();
    let v = tampered.c2.get(0, 0);
    tampered.c2.set(0, 0, (v + 1) % params.q as i64);
    assert_ne!(shared_secret(&params, &mu, &tampered).unwrap(), ss);
}

#[test]
fn test_byte_layouts_on_disk() {
    let params = FrodoParams::primal_demo();
    let mut rng = ChaCha20Rng::seed_from_u64(12);
    let (pk, sk) = keygen(&params, &mut rng).unwrap();
    let message: [u8; 16] = rng.gen();
    let (ct, ss, _) = encapsulate(&params, &pk, Some(&message[..]), &mut rng).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let pk_path = dir.path().join("pk.bin");
    let sk_path = dir.path().join("sk.bin");
    let ct_path = dir.path().join("ct.bin");
    fs::write(&pk_path, pk.to_bytes(&params).unwrap()).unwrap();
    fs::write(&sk_path, sk.to_bytes(&params).unwrap()).unwrap();
    fs::write(&ct_path, ct.to_bytes(&params).unwrap()).unwrap();

    let pk_bytes = fs::read(&pk_path).unwrap();
    let sk_bytes = fs::read(&sk_path).unwrap();
    let ct_bytes = fs::read(&ct_path).unwrap();
    assert_eq!(pk_bytes.len(), params.public_key_bytes());
    assert_eq!(sk_bytes.len(), params.secret_key_bytes());
    assert_eq!(ct_bytes.len(), params.ciphertext_bytes());
    assert_eq!(&pk_bytes[..params.seed_bytes], &pk.seed[..]);

    let pk2 = PublicKey::from_bytes(&pk_bytes, &params).unwrap();
    let sk2 = SecretKey::from_bytes(&sk_bytes, &params).unwrap();
    let ct2 = Ciphertext::from_bytes(&ct_bytes, &params).unwrap();
    assert_eq!(pk2, pk);
    assert_eq!(ct2, ct);
    assert_eq!(sk2.centered(params.q), sk);

    let (mu, ss2) = decapsulate(&params, &pk2, &sk2, &ct2).unwrap();
    assert_eq!(mu, message);
    assert_eq!(ss2, ss);
}

#[test]
fn test_truncated_ciphertext_rejected() {
    let params = FrodoParams::reference();
    let mut rng = ChaCha20Rng::seed_from_u64(13);
    let (pk, _) = keygen(&params, &mut rng).unwrap();
    let (ct, _, _) = encapsulate(&params, &pk, None, &mut rng).unwrap();

    let bytes = ct.to_bytes(&params).unwrap();
    let err = Ciphertext::from_bytes(&bytes[..bytes.len() - 2], &params).unwrap_err();
    assert!(matches!(err, LweError::Encoding(_)));
}

#[test]
fn test_decapsulate_rejects_mismatched_shapes() {
    let params = FrodoParams::reference();
    let other = FrodoParams::primal_demo();
    let mut rng = ChaCha20Rng::seed_from_u64(14);
    let (pk, sk) = keygen(&params, &mut rng).unwrap();
    let (ct, _, _) = encapsulate(&params, &pk, None, &mut rng).unwrap();

    // primal-demo has m = 80, so B has the wrong number of rows
    let err = decapsulate(&other, &pk, &sk, &ct).unwrap_err();
    assert!(matches!(err, LweError::Encoding(_)));
}
