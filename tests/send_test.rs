//! End-to-end send tests against the Esplora mock
//!
//! Each test derives the "abandon ... about" wallet, funds its address on
//! the mock chain and drives `WalletManager` over real HTTP.

mod common;

use bitcoin::consensus::encode;
use bitcoin::{Amount, TxOut};
use common::{foreign_address, funding_tx, verify_p2pkh_inputs, TestEnvironment};
use phrase_wallet::{ErrorKind, WalletError};

#[tokio::test]
async fn test_send_with_change_broadcasts_signed_transaction() {
    let env = TestEnvironment::new().await.unwrap();
    let funding = env.fund(&[5000, 3000, 2000]);
    let destination = foreign_address(9);

    let receipt = env
        .wallet
        .send(&destination.to_string(), 6000)
        .await
        .expect("send should succeed");

    assert_eq!(receipt.input_count, 2);
    assert_eq!(receipt.amount_sats, 6000);
    assert_eq!(receipt.fee_sats, 1000);
    assert_eq!(receipt.change_sats, 1000);

    let broadcasts = env.broadcasts();
    assert_eq!(broadcasts.len(), 1);
    let tx = &broadcasts[0];
    assert_eq!(tx.compute_txid(), receipt.txid);
    assert_eq!(encode::serialize_hex(tx), receipt.tx_hex);

    // First two UTXOs in listing order
    assert_eq!(tx.input[0].previous_output.txid, funding.compute_txid());
    assert_eq!(tx.input[0].previous_output.vout, 0);
    assert_eq!(tx.input[1].previous_output.vout, 1);

    assert_eq!(
        tx.output,
        vec![
            TxOut {
                value: Amount::from_sat(6000),
                script_pubkey: destination.script_pubkey(),
            },
            TxOut {
                value: Amount::from_sat(1000),
                script_pubkey: env.wallet.address().script_pubkey(),
            },
        ]
    );

    let keys = verify_p2pkh_inputs(tx, &funding.output[..2]);
    assert!(keys.iter().all(|k| *k == env.wallet.keys().public_key));
}

#[tokio::test]
async fn test_send_exact_amount_has_no_change_output() {
    let env = TestEnvironment::new().await.unwrap();
    let funding = env.fund(&[4000, 3000]);

    let receipt = env
        .wallet
        .send(&foreign_address(9).to_string(), 6000)
        .await
        .unwrap();

    assert_eq!(receipt.change_sats, 0);
    let tx = &env.broadcasts()[0];
    assert_eq!(tx.output.len(), 1);
    assert_eq!(tx.output[0].value, Amount::from_sat(6000));
    verify_p2pkh_inputs(tx, &funding.output);
}

#[tokio::test]
async fn test_send_spends_utxos_from_several_transactions() {
    let env = TestEnvironment::new().await.unwrap();
    let address = env.wallet.address().clone();
    let first = funding_tx(&address, &[1500], 1);
    let second = funding_tx(&address, &[2500, 700], 2);
    {
        let mut chain = env.state.write().unwrap();
        chain.fund_address(&address, &first);
        chain.fund_address(&address, &second);
    }

    env.wallet
        .send(&foreign_address(3).to_string(), 2000)
        .await
        .unwrap();

    let tx = &env.broadcasts()[0];
    assert_eq!(tx.input.len(), 2);
    assert_eq!(tx.input[0].previous_output.txid, first.compute_txid());
    assert_eq!(tx.input[1].previous_output.txid, second.compute_txid());
    assert_eq!(tx.output[1].value, Amount::from_sat(1000));
    verify_p2pkh_inputs(tx, &[first.output[0].clone(), second.output[0].clone()]);
}

#[tokio::test]
async fn test_send_without_utxos_fails_before_broadcast() {
    let env = TestEnvironment::new().await.unwrap();

    let err = env
        .wallet
        .send(&foreign_address(9).to_string(), 1000)
        .await
        .unwrap_err();

    assert!(matches!(err, WalletError::NoUtxosAvailable));
    assert_eq!(err.kind(), ErrorKind::FundsAvailability);
    assert!(env.broadcasts().is_empty());
}

#[tokio::test]
async fn test_send_insufficient_funds_reports_totals() {
    let env = TestEnvironment::new().await.unwrap();
    env.fund(&[1000, 3000]);

    let err = env
        .wallet
        .send(&foreign_address(9).to_string(), 6000)
        .await
        .unwrap_err();

    match err {
        WalletError::InsufficientFunds { needed, have } => {
            assert_eq!(needed, 7000);
            assert_eq!(have, 4000);
        }
        other => panic!("expected InsufficientFunds, got {:?}", other),
    }
    assert!(env.broadcasts().is_empty());
}

#[tokio::test]
async fn test_send_rejects_bad_destination_without_network_calls() {
    let env = TestEnvironment::new().await.unwrap();
    env.fund(&[5000]);

    let err = env.wallet.send("not-an-address", 1000).await.unwrap_err();
    assert!(matches!(err, WalletError::InvalidAddress(_)));

    // Mainnet address on a testnet wallet
    let err = env
        .wallet
        .send("1LqBGSKuX5yYUonjxT5qGfpUsXKYYWeabA", 1000)
        .await
        .unwrap_err();
    assert!(matches!(err, WalletError::InvalidAddress(_)));
    assert!(env.broadcasts().is_empty());
}

#[tokio::test]
async fn test_send_rejects_zero_and_oversized_amounts() {
    let env = TestEnvironment::new().await.unwrap();
    env.fund(&[5000]);
    let destination = foreign_address(9).to_string();

    let err = env.wallet.send(&destination, 0).await.unwrap_err();
    assert!(matches!(err, WalletError::InvalidAmount(0)));
    assert_eq!(err.kind(), ErrorKind::InputValidation);

    let err = env
        .wallet
        .send(&destination, Amount::MAX_MONEY.to_sat() + 1)
        .await
        .unwrap_err();
    assert!(matches!(err, WalletError::InvalidAmount(_)));
    assert!(env.broadcasts().is_empty());
}

#[tokio::test]
async fn test_broadcast_rejection_surfaces_reason() {
    let env = TestEnvironment::new().await.unwrap();
    env.fund(&[5000]);
    env.state
        .write()
        .unwrap()
        .reject_broadcasts("min relay fee not met");

    let err = env
        .wallet
        .send(&foreign_address(9).to_string(), 1000)
        .await
        .unwrap_err();

    match &err {
        WalletError::BroadcastRejected(reason) => {
            assert!(reason.contains("min relay fee not met"), "reason: {}", reason)
        }
        other => panic!("expected BroadcastRejected, got {:?}", other),
    }
    assert_eq!(err.kind(), ErrorKind::NetworkFailure);
}

#[tokio::test]
async fn test_malformed_previous_transaction_is_network_failure() {
    let env = TestEnvironment::new().await.unwrap();
    let funding = env.fund(&[5000]);
    env.state
        .write()
        .unwrap()
        .set_raw_transaction(&funding.compute_txid(), "deadbeef");

    let err = env
        .wallet
        .send(&foreign_address(9).to_string(), 1000)
        .await
        .unwrap_err();

    assert!(matches!(err, WalletError::Network(_)), "got {:?}", err);
    assert!(env.broadcasts().is_empty());
}

#[tokio::test]
async fn test_previous_transaction_with_wrong_txid_is_rejected() {
    let env = TestEnvironment::new().await.unwrap();
    let funding = env.fund(&[5000]);
    let impostor = funding_tx(env.wallet.address(), &[5000], 42);
    env.state
        .write()
        .unwrap()
        .set_raw_transaction(&funding.compute_txid(), encode::serialize_hex(&impostor));

    let err = env
        .wallet
        .send(&foreign_address(9).to_string(), 1000)
        .await
        .unwrap_err();

    assert!(matches!(err, WalletError::Network(_)), "got {:?}", err);
    assert!(env.broadcasts().is_empty());
}

#[tokio::test]
async fn test_balance_reports_funded_minus_spent() {
    let env = TestEnvironment::new().await.unwrap();
    env.fund(&[5000, 3000, 2000]);

    let balance = env.wallet.balance().await.unwrap();
    assert_eq!(balance.funded_sats, 10_000);
    assert_eq!(balance.spent_sats, 0);
    assert_eq!(balance.tx_count, 1);
    assert_eq!(balance.balance_sats(), 10_000);
}

#[tokio::test]
async fn test_unreachable_service_is_network_failure() {
    common::init_logging();
    let client = phrase_wallet::EsploraClient::new("http://127.0.0.1:9");
    let wallet = phrase_wallet::WalletManager::with_client(
        common::test_config(),
        &common::test_phrase(),
        client,
    )
    .unwrap();

    let err = wallet.balance().await.unwrap_err();
    assert!(matches!(err, WalletError::Network(_)));

    let err = wallet
        .send(&foreign_address(9).to_string(), 1000)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NetworkFailure);
}
