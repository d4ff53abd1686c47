//! Timelocked pay-to-script-hash spends against an in-memory test network.
//!
//! The redeem script lets Alice spend alone once the lock time has passed,
//! or Alice and Bob together at any time:
//!
//! ```text
//! OP_IF <expiry> OP_CHECKLOCKTIMEVERIFY OP_DROP
//! OP_ELSE <bob> OP_CHECKSIGVERIFY OP_ENDIF
//! <alice> OP_CHECKSIG
//! ```

use std::cell::RefCell;
use std::collections::HashMap;

use icocoin_primitives::chainhash::ChainHash;
use icocoin_primitives::ec::{KeyPair, Signature};
use icocoin_primitives::hash::hash160;
use icocoin_primitives::network::Network;
use icocoin_primitives::ErrorKind;
use icocoin_script::opcodes::*;
use icocoin_script::templates::script_hash;
use icocoin_script::{number, Address, Chunk, Script};
use icocoin_transaction::input::DEFAULT_SEQUENCE_NUMBER;
use icocoin_transaction::sighash::SIGHASH_ALL;
use icocoin_transaction::{
    BroadcastFailure, BroadcastSuccess, Broadcaster, Faucet, Transaction, TransactionBuilder,
    TransactionError, TransactionOutput, Unspent,
};

const ALICE_WIF: &str = "cScfkGjbzzoeewVWmU2hYPUHeVGJRDdFt7WhmrVVGkxpmPP8BHWe";
const BOB_WIF: &str = "cMkopUXKWsEzAjfa1zApksGRwjVpJRB3831qM9W4gKZsLwjHXA9x";
const RETURN_ADDRESS: &str = "mrG31vZtaj3WW8xzGz3ZjiCW6gaAtD6rMN";

/// Median time past of the simulated chain tip.
const NOW: u32 = 1_700_000_000;

/// Lock times at or above this are Unix timestamps, below it block heights.
const LOCKTIME_THRESHOLD: u32 = 500_000_000;

fn alice() -> KeyPair {
    KeyPair::from_wif(ALICE_WIF, &Network::TESTNET).unwrap()
}

fn bob() -> KeyPair {
    KeyPair::from_wif(BOB_WIF, &Network::TESTNET).unwrap()
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn cltv_check_sig_output(a: &KeyPair, b: &KeyPair, expiry: u32) -> Script {
    Script::from_chunks(&[
        Chunk::Op(OP_IF),
        Chunk::push(number::encode(i64::from(expiry))),
        Chunk::Op(OP_CHECKLOCKTIMEVERIFY),
        Chunk::Op(OP_DROP),
        Chunk::Op(OP_ELSE),
        Chunk::push(b.public_key_bytes()),
        Chunk::Op(OP_CHECKSIGVERIFY),
        Chunk::Op(OP_ENDIF),
        Chunk::push(a.public_key_bytes()),
        Chunk::Op(OP_CHECKSIG),
    ])
    .unwrap()
}

// -----------------------------------------------------------------------
// In-memory network
// -----------------------------------------------------------------------

/// A faucet and relay sharing one unspent-output set.
///
/// Relaying applies the finality rule and checks the timelock redeem script
/// above; it is not a general script interpreter.
#[derive(Default)]
struct TestNetwork {
    utxos: RefCell<HashMap<(ChainHash, u32), TransactionOutput>>,
    funded: RefCell<u32>,
}

impl Faucet for TestNetwork {
    fn fund(&self, address: &Address, value: i64) -> Result<Unspent, BroadcastFailure> {
        let script = address
            .to_output_script(&Network::TESTNET)
            .map_err(|e| BroadcastFailure::new("400", e.to_string()))?;
        let mut funded = self.funded.borrow_mut();
        let seed = if *funded == 0 {
            "faucet".to_string()
        } else {
            format!("faucet{}", *funded)
        };
        *funded += 1;

        let tx_id = ChainHash::sha256d(seed.as_bytes());
        self.utxos
            .borrow_mut()
            .insert((tx_id, 0), TransactionOutput::new(script, value));
        Ok(Unspent {
            tx_id,
            vout: 0,
            value,
        })
    }
}

impl Broadcaster for TestNetwork {
    fn broadcast(&self, tx: &Transaction) -> Result<BroadcastSuccess, BroadcastFailure> {
        let is_final = tx.lock_time == 0
            || (tx.lock_time >= LOCKTIME_THRESHOLD && tx.lock_time < NOW)
            || tx.inputs.iter().all(|i| i.sequence == DEFAULT_SEQUENCE_NUMBER);
        if !is_final {
            return Err(BroadcastFailure::new("64", "non-final"));
        }

        let utxos = self.utxos.borrow();
        for (vin, input) in tx.inputs.iter().enumerate() {
            let spent = utxos
                .get(&(input.prev_hash, input.prev_index))
                .ok_or_else(|| BroadcastFailure::new("-25", "missing inputs"))?;
            if !spends_timelock(tx, vin, &spent.script) {
                return Err(BroadcastFailure::new(
                    "16",
                    "mandatory-script-verify-flag-failed",
                ));
            }
        }
        drop(utxos);

        let mut utxos = self.utxos.borrow_mut();
        for input in &tx.inputs {
            utxos.remove(&(input.prev_hash, input.prev_index));
        }
        let tx_id = tx.id();
        for (vout, output) in tx.outputs.iter().enumerate() {
            utxos.insert((tx_id, vout as u32), output.clone());
        }
        Ok(BroadcastSuccess {
            txid: tx_id.to_string(),
            message: "accepted".to_string(),
        })
    }
}

/// Whether input `vin` satisfies a timelock redeem script behind `prev_script`.
fn spends_timelock(tx: &Transaction, vin: usize, prev_script: &Script) -> bool {
    let Some((args, redeem)) = script_hash::input::decode(&tx.inputs[vin].script) else {
        return false;
    };
    if script_hash::output::for_redeem_script(&redeem) != *prev_script {
        return false;
    }
    let Ok(chunks) = redeem.chunks() else {
        return false;
    };
    let (Some(expiry), Some(bob_key), Some(alice_key)) =
        (chunks[1].data(), chunks[5].data(), chunks[8].data())
    else {
        return false;
    };

    let check = |sig: &Chunk, key: &[u8]| -> bool {
        let Some(bytes) = sig.data() else {
            return false;
        };
        let Ok(parsed) = Signature::parse_script_signature(bytes) else {
            return false;
        };
        let Ok(digest) = tx.hash_for_signature(vin, &redeem, parsed.hash_type) else {
            return false;
        };
        KeyPair::from_public_key(key, Network::TESTNET)
            .map(|k| k.verify(&digest, &parsed.signature))
            .unwrap_or(false)
    };

    match args.as_slice() {
        [alice_sig, Chunk::Op(OP_TRUE)] => {
            let Ok(expiry) = number::decode(expiry, 5, true) else {
                return false;
            };
            let expiry_is_time = expiry >= i64::from(LOCKTIME_THRESHOLD);
            let lock_is_time = tx.lock_time >= LOCKTIME_THRESHOLD;
            expiry_is_time == lock_is_time
                && i64::from(tx.lock_time) >= expiry
                && tx.inputs[vin].sequence != DEFAULT_SEQUENCE_NUMBER
                && check(alice_sig, alice_key)
        }
        [alice_sig, bob_sig, Chunk::Op(OP_FALSE)] => {
            check(bob_sig, bob_key) && check(alice_sig, alice_key)
        }
        _ => false,
    }
}

// -----------------------------------------------------------------------
// Scenarios
// -----------------------------------------------------------------------

/// Fund the timelock address, then build the unsigned spend back to Alice.
fn fund_and_build(network: &TestNetwork, redeem: &Script, lock_time: u32) -> Transaction {
    let address = Address::p2sh(hash160(redeem.as_bytes()), &Network::TESTNET);
    let unspent = network.fund(&address, 20_000).unwrap();

    let mut builder = TransactionBuilder::new(Network::TESTNET);
    builder.set_lock_time(lock_time).unwrap();
    builder
        .add_input(unspent.tx_id, unspent.vout, 0xffff_fffe, None)
        .unwrap();
    builder
        .add_output_address(&RETURN_ADDRESS.parse::<Address>().unwrap(), 10_000)
        .unwrap();
    builder.build_incomplete()
}

fn sign_alone(tx: &mut Transaction, redeem: &Script, key: &KeyPair) -> [u8; 32] {
    let digest = tx.hash_for_signature(0, redeem, SIGHASH_ALL).unwrap();
    let sig = key
        .sign(&digest)
        .unwrap()
        .to_script_signature(SIGHASH_ALL)
        .unwrap();
    let script_sig =
        script_hash::input::encode(&[Chunk::push(sig), Chunk::Op(OP_TRUE)], redeem).unwrap();
    tx.set_input_script(0, script_sig).unwrap();
    digest
}

#[test]
fn alice_redeems_after_expiry() {
    init_tracing();
    let network = TestNetwork::default();
    let expiry = 1_500_000_000;
    let redeem = cltv_check_sig_output(&alice(), &bob(), expiry);
    assert_eq!(
        redeem.to_hex(),
        "6304002f6859b1756721038f0248cc0bebc425eb55af1689a59f88119c69430a860c6a05f340e445c417d7ad6821038ea27103fb646a2cea9eca9080737e0b23640caaaef2853416c9b286b353313eac"
    );
    let p2sh = script_hash::output::for_redeem_script(&redeem);
    assert_eq!(p2sh.to_hex(), "a9149c34941ef1ee2cb0a934cb7eeb40aa668184f61687");
    assert_eq!(
        Address::from_output_script(&p2sh, &Network::TESTNET)
            .unwrap()
            .to_string(),
        "2N7VAPS9q2nms2SnPPXEe4WVAwdrSuufrfV"
    );

    let mut tx = fund_and_build(&network, &redeem, expiry);
    let digest = sign_alone(&mut tx, &redeem, &alice());
    assert_eq!(
        hex::encode(digest),
        "b9525db7cf779f04e2c825eaf017e22e3b6ad8ff2d3dcb92cb087ce9d1722942"
    );
    assert_eq!(
        tx.to_hex(),
        "0100000001201cb2926b4f3d02ff030839e2d6eedc3e5e6144ff3c239135672110bbe37811000000009b473044022042f1d8c16c0030ee032e61494de53b99a00c03a6833ba0bbfd22ed4858db071102207582982a31e784ef98b19228cc32ed542d962599e3a2dd5800e4f3ac2be3cb1d01514c506304002f6859b1756721038f0248cc0bebc425eb55af1689a59f88119c69430a860c6a05f340e445c417d7ad6821038ea27103fb646a2cea9eca9080737e0b23640caaaef2853416c9b286b353313eacfeffffff0110270000000000001976a91475d715f9a84555e752772c9ad62be90b3b7bb88a88ac002f6859"
    );

    let success = network.broadcast(&tx).unwrap();
    assert_eq!(
        success.txid,
        "0974fbc407b8592872483c2d28f373a8d9c7f718f6b7dfd5e4b0370766a0d58c"
    );
}

#[test]
fn alice_and_bob_redeem_any_time() {
    init_tracing();
    let network = TestNetwork::default();
    let expiry = NOW - 3600 * 2;
    let redeem = cltv_check_sig_output(&alice(), &bob(), expiry);
    let mut tx = fund_and_build(&network, &redeem, expiry);

    let digest = tx.hash_for_signature(0, &redeem, SIGHASH_ALL).unwrap();
    let sig = |key: &KeyPair| {
        Chunk::push(
            key.sign(&digest)
                .unwrap()
                .to_script_signature(SIGHASH_ALL)
                .unwrap(),
        )
    };
    let script_sig = script_hash::input::encode(
        &[sig(&alice()), sig(&bob()), Chunk::Op(OP_FALSE)],
        &redeem,
    )
    .unwrap();
    tx.set_input_script(0, script_sig).unwrap();

    assert!(network.broadcast(&tx).is_ok());
    // The output is spent now.
    assert_eq!(
        network.broadcast(&tx).unwrap_err(),
        BroadcastFailure::new("-25", "missing inputs")
    );
}

#[test]
fn alice_cannot_redeem_before_expiry() {
    init_tracing();
    let network = TestNetwork::default();
    let expiry = 4_000_000_000;
    let redeem = cltv_check_sig_output(&alice(), &bob(), expiry);
    assert_eq!(
        script_hash::output::for_redeem_script(&redeem).to_hex(),
        "a9142d27698cbc5c0573f41521cb08ee205dee2cc49e87"
    );

    let mut tx = fund_and_build(&network, &redeem, expiry);
    let digest = sign_alone(&mut tx, &redeem, &alice());
    assert_eq!(
        hex::encode(digest),
        "b4c1c27dbf85216fb12568840cf88f084e0c51c9784851540e874d51ce4f8e6e"
    );
    assert_eq!(
        tx.to_hex(),
        "0100000001201cb2926b4f3d02ff030839e2d6eedc3e5e6144ff3c239135672110bbe37811000000009d483045022100bd0077a9f3dc93f136ad5e6c15e40e10b9e91138030a2fe48482cc41502ec62f02206a003db2637b6a93abfe08ec432adb22b95c8de4a308b39315fb5b1fefaf377b01514c51630500286bee00b1756721038f0248cc0bebc425eb55af1689a59f88119c69430a860c6a05f340e445c417d7ad6821038ea27103fb646a2cea9eca9080737e0b23640caaaef2853416c9b286b353313eacfeffffff0110270000000000001976a91475d715f9a84555e752772c9ad62be90b3b7bb88a88ac00286bee"
    );
    assert_eq!(
        tx.id_hex(),
        "d7d89954592a889d4b230e37e7cd3331030dbf1ecbf7745e9f352d0eb3dbfdb1"
    );

    let relay = |tx: &Transaction| -> Result<String, TransactionError> {
        Ok(network.broadcast(tx)?.txid)
    };
    let err = relay(&tx).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::External);
    assert_eq!(err.to_string(), "64: non-final");
}

#[test]
fn bob_cannot_redeem_alone() {
    init_tracing();
    let network = TestNetwork::default();
    let expiry = 1_500_000_000;
    let redeem = cltv_check_sig_output(&alice(), &bob(), expiry);
    let mut tx = fund_and_build(&network, &redeem, expiry);
    sign_alone(&mut tx, &redeem, &bob());

    assert_eq!(network.broadcast(&tx).unwrap_err().code, "16");
}

#[test]
fn past_and_future_spends_differ_only_in_expiry() {
    init_tracing();
    let spend = |expiry: u32| {
        let network = TestNetwork::default();
        let redeem = cltv_check_sig_output(&alice(), &bob(), expiry);
        let mut tx = fund_and_build(&network, &redeem, expiry);
        sign_alone(&mut tx, &redeem, &alice());
        let result = network.broadcast(&tx);
        (tx, redeem, result)
    };
    let (past, past_redeem, past_result) = spend(1_500_000_000);
    let (future, future_redeem, future_result) = spend(4_000_000_000);

    assert_eq!(past.version, future.version);
    assert_eq!(past.outputs, future.outputs);
    assert_eq!(past.inputs.len(), 1);
    assert_eq!(future.inputs.len(), 1);
    assert_eq!(past.inputs[0].prev_hash, future.inputs[0].prev_hash);
    assert_eq!(past.inputs[0].prev_index, future.inputs[0].prev_index);
    assert_eq!(past.inputs[0].sequence, future.inputs[0].sequence);
    assert_eq!(past.lock_time, 1_500_000_000);
    assert_eq!(future.lock_time, 4_000_000_000);

    // Redeem scripts match chunk for chunk apart from the pushed expiry.
    let past_chunks = past_redeem.chunks().unwrap();
    let future_chunks = future_redeem.chunks().unwrap();
    assert_eq!(past_chunks.len(), future_chunks.len());
    for (i, (p, f)) in past_chunks.iter().zip(&future_chunks).enumerate() {
        if i == 1 {
            assert_eq!(p.data(), Some(&number::encode(1_500_000_000)[..]));
            assert_eq!(f.data(), Some(&number::encode(4_000_000_000)[..]));
        } else {
            assert_eq!(p, f, "chunk {}", i);
        }
    }

    // Both unlocking scripts have the same shape and both satisfy their
    // script; only finality separates them.
    for (tx, redeem) in [(&past, &past_redeem), (&future, &future_redeem)] {
        let (args, decoded) = script_hash::input::decode(&tx.inputs[0].script).unwrap();
        assert_eq!(&decoded, redeem);
        assert!(matches!(args.as_slice(), [Chunk::Push(_), Chunk::Op(OP_TRUE)]));
        assert!(spends_timelock(
            tx,
            0,
            &script_hash::output::for_redeem_script(redeem)
        ));
    }
    assert!(past_result.is_ok());
    assert_eq!(
        future_result.unwrap_err(),
        BroadcastFailure::new("64", "non-final")
    );
}
