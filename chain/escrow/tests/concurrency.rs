//! Concurrent resolution tests
//!
//! Several threads race to resolve the same offer through one shared bank.
//! Exactly one resolution may commit; every loser must observe
//! `RecordNotFound` and the ledger must balance afterwards.

use std::sync::{Arc, Barrier};
use std::thread;

use escrow::errors::EscrowError;
use escrow::{Bank, EscrowClient};
use escrow_types::ids::{Keypair, Pubkey};

const DEPOSIT: u64 = 1_000_000_000;
const ASK: u64 = 5_000_000_000;

struct Market {
    bank: Arc<Bank>,
    issuer: Keypair,
    maker: Arc<Keypair>,
    mint_a: Pubkey,
    mint_b: Pubkey,
}

fn setup() -> Market {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let bank = Arc::new(Bank::default());
    let issuer = Keypair::new();
    let maker = Keypair::new();
    let mint_a = bank.create_mint(&issuer.pubkey(), 9).unwrap();
    let mint_b = bank.create_mint(&issuer.pubkey(), 9).unwrap();
    bank.airdrop(&maker.pubkey(), 10_000_000_000).unwrap();
    bank.mint_to(&mint_a, &maker.pubkey(), DEPOSIT, &issuer).unwrap();

    Market {
        bank,
        issuer,
        maker: Arc::new(maker),
        mint_a,
        mint_b,
    }
}

fn funded_taker(m: &Market) -> Arc<Keypair> {
    let taker = Keypair::new();
    m.bank.airdrop(&taker.pubkey(), 10_000_000_000).unwrap();
    m.bank.mint_to(&m.mint_b, &taker.pubkey(), ASK, &m.issuer).unwrap();
    Arc::new(taker)
}

#[test]
fn test_take_and_refund_race_single_winner() {
    for round in 0..20u64 {
        let m = setup();
        let client = EscrowClient::new(Arc::clone(&m.bank));
        let escrow = client
            .make(&m.maker, round, DEPOSIT, ASK, &m.mint_a, &m.mint_b)
            .unwrap();
        let taker = funded_taker(&m);
        let barrier = Arc::new(Barrier::new(2));

        let take_handle = {
            let client = client.clone();
            let barrier = Arc::clone(&barrier);
            let taker = Arc::clone(&taker);
            thread::spawn(move || {
                barrier.wait();
                client.take(&taker, &escrow).map(|_| ())
            })
        };
        let refund_handle = {
            let client = client.clone();
            let barrier = Arc::clone(&barrier);
            let maker = Arc::clone(&m.maker);
            thread::spawn(move || {
                barrier.wait();
                client.refund(&maker, &escrow).map(|_| ())
            })
        };

        let take_result = take_handle.join().unwrap();
        let refund_result = refund_handle.join().unwrap();

        match (&take_result, &refund_result) {
            (Ok(()), Err(e)) => {
                assert_eq!(*e, EscrowError::RecordNotFound { address: escrow });
                assert_eq!(m.bank.balance_of(&m.mint_a, &taker.pubkey()), DEPOSIT);
                assert_eq!(m.bank.balance_of(&m.mint_b, &m.maker.pubkey()), ASK);
            }
            (Err(e), Ok(())) => {
                assert_eq!(*e, EscrowError::RecordNotFound { address: escrow });
                assert_eq!(m.bank.balance_of(&m.mint_a, &m.maker.pubkey()), DEPOSIT);
                assert_eq!(m.bank.balance_of(&m.mint_b, &taker.pubkey()), ASK);
            }
            other => panic!("exactly one resolution must win, got {other:?}"),
        }
        assert!(client.fetch_escrow(&escrow).unwrap().is_none());
        assert_eq!(m.bank.slot(), 2, "open plus one resolution");
    }
}

#[test]
fn test_many_takers_single_fill() {
    let m = setup();
    let client = EscrowClient::new(Arc::clone(&m.bank));
    let escrow = client
        .make(&m.maker, 1, DEPOSIT, ASK, &m.mint_a, &m.mint_b)
        .unwrap();

    let takers: Vec<Arc<Keypair>> = (0..8).map(|_| funded_taker(&m)).collect();
    let barrier = Arc::new(Barrier::new(takers.len()));

    let handles: Vec<_> = takers
        .iter()
        .map(|taker| {
            let client = client.clone();
            let barrier = Arc::clone(&barrier);
            let taker = Arc::clone(taker);
            thread::spawn(move || {
                barrier.wait();
                client.take(&taker, &escrow)
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let winners = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1, "exactly one taker fills the offer");
    for err in results.iter().filter_map(|r| r.as_ref().err()) {
        assert_eq!(*err, EscrowError::RecordNotFound { address: escrow });
    }

    let total_a: u64 = takers
        .iter()
        .map(|t| m.bank.balance_of(&m.mint_a, &t.pubkey()))
        .sum();
    let total_b: u64 = takers
        .iter()
        .map(|t| m.bank.balance_of(&m.mint_b, &t.pubkey()))
        .sum();
    assert_eq!(total_a, DEPOSIT);
    assert_eq!(total_b + m.bank.balance_of(&m.mint_b, &m.maker.pubkey()), ASK * 8);
}

#[test]
fn test_independent_offers_settle_in_parallel() {
    let m = setup();
    let client = EscrowClient::new(Arc::clone(&m.bank));
    let per_offer = DEPOSIT / 4;
    let escrows: Vec<Pubkey> = (0..4)
        .map(|seed| {
            client
                .make(&m.maker, seed, per_offer, ASK, &m.mint_a, &m.mint_b)
                .unwrap()
        })
        .collect();

    let handles: Vec<_> = escrows
        .iter()
        .map(|&escrow| {
            let client = client.clone();
            let taker = funded_taker(&m);
            thread::spawn(move || client.take(&taker, &escrow))
        })
        .collect();

    for handle in handles {
        handle.join().unwrap().unwrap();
    }
    assert_eq!(m.bank.balance_of(&m.mint_b, &m.maker.pubkey()), ASK * 4);
    assert_eq!(m.bank.events().len(), 8);
}
