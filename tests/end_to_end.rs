//! End-to-end bridging across the two-chain fixture
//!
//! Every scenario runs over both transports: the properties under test
//! (custody accounting, fee handling, exactly-once settlement) do not depend
//! on which transport carried the message.

use alloy_primitives::{Address, B256, U256};
use rstest::rstest;
use token6022_bridge::testing::{TwoChainFixture, FUNDING};
use token6022_bridge::{BridgeError, DeliveryOutcome, Result, SendReceipt, Transport};

fn tokens(n: u64) -> U256 {
    U256::from(n) * U256::from(10u64).pow(U256::from(18u64))
}

fn quote_from_a(
    fixture: &TwoChainFixture,
    transport: Transport,
    sender: Address,
    to: Address,
    amount: U256,
) -> U256 {
    match transport {
        Transport::LayerZero => {
            let params = fixture.lz_to_b(to, amount, B256::ZERO);
            fixture
                .a()
                .quote_lz_send(fixture.canonical.lz_adapter, &params, false)
                .unwrap()
                .native_fee
        }
        Transport::Ccip => {
            let params = fixture.ccip_to_b(to, amount, B256::ZERO);
            fixture
                .a()
                .quote_ccip_send(fixture.canonical.ccip_adapter, sender, &params)
                .unwrap()
        }
    }
}

fn send_from_a(
    fixture: &mut TwoChainFixture,
    transport: Transport,
    sender: Address,
    to: Address,
    amount: U256,
    user_transfer_id: B256,
    value: U256,
) -> Result<SendReceipt> {
    match transport {
        Transport::LayerZero => {
            let params = fixture.lz_to_b(to, amount, user_transfer_id);
            let adapter = fixture.canonical.lz_adapter;
            fixture.a_mut().send_with_lz(sender, adapter, &params, value)
        }
        Transport::Ccip => {
            let params = fixture.ccip_to_b(to, amount, user_transfer_id);
            let adapter = fixture.canonical.ccip_adapter;
            fixture.a_mut().send_with_ccip(sender, adapter, &params, value)
        }
    }
}

fn fee_sink_a(fixture: &TwoChainFixture, transport: Transport) -> Address {
    match transport {
        Transport::LayerZero => fixture.a().lz_endpoint().unwrap().address(),
        Transport::Ccip => fixture.a().ccip_router().unwrap().address(),
    }
}

#[rstest]
#[case::layerzero(Transport::LayerZero)]
#[case::ccip(Transport::Ccip)]
fn test_lock_on_canonical_mints_on_satellite(#[case] transport: Transport) {
    let mut fixture = TwoChainFixture::new().unwrap();
    let (sender, recipient) = (fixture.owner_a, fixture.bob);
    fixture.approve_core(sender, tokens(5)).unwrap();

    let fee = quote_from_a(&fixture, transport, sender, recipient, tokens(5));
    let receipt = send_from_a(
        &mut fixture,
        transport,
        sender,
        recipient,
        tokens(5),
        B256::ZERO,
        fee,
    )
    .unwrap();

    assert_eq!(receipt.fee, fee);
    assert_eq!(receipt.refund, U256::ZERO);
    assert_eq!(fixture.a().native_balance(sender), FUNDING - fee);
    assert_eq!(fixture.a().native_balance(fee_sink_a(&fixture, transport)), fee);

    let reports = fixture.mesh.relay_all();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].transport, transport);
    assert_eq!(reports[0].delivery_id, receipt.delivery_id);
    assert!(matches!(
        &reports[0].outcome,
        DeliveryOutcome::Delivered(message) if message.transfer_id == receipt.transfer_id
    ));

    assert_eq!(
        fixture.a().custody_balance(fixture.canonical.core).unwrap(),
        tokens(5)
    );
    assert_eq!(fixture.balance_a(sender), tokens(95));
    assert_eq!(fixture.balance_b(recipient), tokens(5));
    assert_eq!(fixture.b().total_supply(fixture.satellite.asset), tokens(5));
    assert_eq!(fixture.custody_surplus(), U256::ZERO);

    let core_a = fixture.a().core(fixture.canonical.core).unwrap();
    let core_b = fixture.b().core(fixture.satellite.core).unwrap();
    assert!(core_a.outbound_transfers(&receipt.transfer_id));
    assert!(core_b.inbound_transfers(&receipt.transfer_id));
    assert!(core_b.inbound_transport_ids(&receipt.delivery_id));
}

#[rstest]
#[case::back_over_layerzero(Transport::Ccip, Transport::LayerZero)]
#[case::back_over_ccip(Transport::LayerZero, Transport::Ccip)]
fn test_round_trip_burns_and_releases(#[case] out: Transport, #[case] back: Transport) {
    let mut fixture = TwoChainFixture::new().unwrap();
    let (sender, bob, alice) = (fixture.owner_a, fixture.bob, fixture.alice);
    fixture.approve_core(sender, tokens(5)).unwrap();
    let fee = quote_from_a(&fixture, out, sender, bob, tokens(5));
    send_from_a(&mut fixture, out, sender, bob, tokens(5), B256::ZERO, fee).unwrap();
    fixture.mesh.relay_all();

    let receipt = match back {
        Transport::LayerZero => {
            let params = fixture.lz_to_a(alice, tokens(3), B256::ZERO);
            fixture.send_lz_from_b(bob, &params).unwrap()
        }
        Transport::Ccip => {
            let params = fixture.ccip_to_a(alice, tokens(3), B256::ZERO);
            fixture.send_ccip_from_b(bob, &params).unwrap()
        }
    };

    // burned on send, released on delivery
    assert_eq!(fixture.b().total_supply(fixture.satellite.asset), tokens(2));
    assert_eq!(fixture.custody_surplus(), tokens(3));

    let reports = fixture.mesh.relay_all();
    assert!(reports.iter().all(|report| report.outcome.is_delivered()));
    assert_eq!(fixture.balance_a(alice), tokens(3));
    assert_eq!(fixture.balance_b(bob), tokens(2));
    assert_eq!(
        fixture.a().custody_balance(fixture.canonical.core).unwrap(),
        tokens(2)
    );
    assert_eq!(fixture.custody_surplus(), U256::ZERO);
    assert!(fixture
        .a()
        .core(fixture.canonical.core)
        .unwrap()
        .inbound_transfers(&receipt.transfer_id));
}

#[rstest]
#[case::layerzero(Transport::LayerZero)]
#[case::ccip(Transport::Ccip)]
fn test_underpaid_fee_reverts_without_side_effects(#[case] transport: Transport) {
    let mut fixture = TwoChainFixture::new().unwrap();
    let (sender, recipient) = (fixture.owner_a, fixture.bob);
    fixture.approve_core(sender, tokens(5)).unwrap();
    let fee = quote_from_a(&fixture, transport, sender, recipient, tokens(5));
    let before = fixture.a().state().clone();

    let err = send_from_a(
        &mut fixture,
        transport,
        sender,
        recipient,
        tokens(5),
        B256::ZERO,
        fee - U256::from(1u64),
    )
    .unwrap_err();

    assert!(matches!(
        err,
        BridgeError::InvalidNativeFee { paid, required }
            if paid == fee - U256::from(1u64) && required == fee
    ));
    assert_eq!(*fixture.a().state(), before);
    assert_eq!(fixture.balance_a(sender), tokens(100));
    assert_eq!(fixture.a().native_balance(sender), FUNDING);
    assert_eq!(fixture.mesh.pending(), 0);
}

#[rstest]
#[case::layerzero(Transport::LayerZero)]
#[case::ccip(Transport::Ccip)]
fn test_overpaid_fee_is_refunded(#[case] transport: Transport) {
    let mut fixture = TwoChainFixture::new().unwrap();
    let (sender, recipient) = (fixture.owner_a, fixture.bob);
    fixture.approve_core(sender, tokens(5)).unwrap();
    let fee = quote_from_a(&fixture, transport, sender, recipient, tokens(5));

    let receipt = send_from_a(
        &mut fixture,
        transport,
        sender,
        recipient,
        tokens(5),
        B256::ZERO,
        fee + U256::from(1u64),
    )
    .unwrap();

    assert_eq!(receipt.fee, fee);
    assert_eq!(receipt.refund, U256::from(1u64));
    assert_eq!(fixture.a().native_balance(sender), FUNDING - fee);
    assert_eq!(fixture.a().native_balance(fee_sink_a(&fixture, transport)), fee);

    fixture.mesh.relay_all();
    assert_eq!(fixture.balance_b(recipient), tokens(5));
}

#[rstest]
#[case::layerzero(Transport::LayerZero)]
#[case::ccip(Transport::Ccip)]
fn test_repeated_send_with_same_nonce_reverts(#[case] transport: Transport) {
    let mut fixture = TwoChainFixture::new().unwrap();
    let (sender, recipient) = (fixture.owner_a, fixture.bob);
    fixture.approve_core(sender, tokens(10)).unwrap();
    let fee = quote_from_a(&fixture, transport, sender, recipient, tokens(5));
    let nonce = B256::repeat_byte(7);

    let first =
        send_from_a(&mut fixture, transport, sender, recipient, tokens(5), nonce, fee).unwrap();
    let err =
        send_from_a(&mut fixture, transport, sender, recipient, tokens(5), nonce, fee).unwrap_err();

    assert!(matches!(err, BridgeError::TransferReplay(id) if id == first.transfer_id));
    assert_eq!(fixture.balance_a(sender), tokens(95));
}

#[rstest]
#[case::layerzero(Transport::LayerZero)]
#[case::ccip(Transport::Ccip)]
fn test_distinct_senders_with_same_nonce_both_settle(#[case] transport: Transport) {
    let mut fixture = TwoChainFixture::new().unwrap();
    let (owner, alice, bob) = (fixture.owner_a, fixture.alice, fixture.bob);
    fixture.give_a(alice, tokens(5)).unwrap();
    fixture.approve_core(owner, tokens(5)).unwrap();
    fixture.approve_core(alice, tokens(5)).unwrap();
    let fee = quote_from_a(&fixture, transport, owner, bob, tokens(5));
    let nonce = B256::repeat_byte(1);

    let first = send_from_a(&mut fixture, transport, owner, bob, tokens(5), nonce, fee).unwrap();
    let second = send_from_a(&mut fixture, transport, alice, bob, tokens(5), nonce, fee).unwrap();
    assert_ne!(first.transfer_id, second.transfer_id);

    let reports = fixture.mesh.relay_all();
    assert_eq!(reports.len(), 2);
    assert!(reports.iter().all(|report| report.outcome.is_delivered()));
    assert_eq!(fixture.balance_b(bob), tokens(10));
}

#[rstest]
#[case::layerzero(Transport::LayerZero)]
#[case::ccip(Transport::Ccip)]
fn test_redelivered_message_does_not_settle_twice(#[case] transport: Transport) {
    let mut fixture = TwoChainFixture::new().unwrap();
    let (sender, recipient) = (fixture.owner_a, fixture.bob);
    fixture.approve_core(sender, tokens(5)).unwrap();
    let fee = quote_from_a(&fixture, transport, sender, recipient, tokens(5));
    send_from_a(&mut fixture, transport, sender, recipient, tokens(5), B256::ZERO, fee).unwrap();

    match transport {
        Transport::LayerZero => {
            let packet = fixture.a_mut().drain_lz_outbox().remove(0);
            let guid = packet.guid;
            let first = fixture.b_mut().lz_deliver(packet.clone()).unwrap();
            assert!(first.is_delivered());

            // the endpoint catches the replay revert and keeps the payload
            let second = fixture.b_mut().lz_deliver(packet).unwrap();
            assert!(matches!(
                second,
                DeliveryOutcome::Stored(BridgeError::TransportReplay(id)) if id == guid
            ));
            assert!(fixture.b().lz_endpoint().unwrap().stored_payload(&guid).is_some());
        }
        Transport::Ccip => {
            let packet = fixture.a_mut().drain_ccip_outbox().remove(0);
            fixture.b_mut().ccip_route(&packet).unwrap();
            let err = fixture.b_mut().ccip_route(&packet).unwrap_err();
            assert!(matches!(
                err,
                BridgeError::TransportReplay(id) if id == packet.message.message_id
            ));
        }
    }

    assert_eq!(fixture.balance_b(recipient), tokens(5));
    assert_eq!(fixture.b().total_supply(fixture.satellite.asset), tokens(5));
}

#[test]
fn test_settled_transfer_id_is_rejected_in_the_other_direction() {
    let mut fixture = TwoChainFixture::new().unwrap();
    let (sender, bob) = (fixture.owner_a, fixture.bob);
    fixture.approve_core(sender, tokens(5)).unwrap();
    let params = fixture.lz_to_b(bob, tokens(5), B256::ZERO);
    let receipt = fixture.send_lz_from_a(sender, &params).unwrap();
    fixture.mesh.relay_all();
    let transfer_id = receipt.transfer_id;

    // inbound on the satellite, so it can never leave the satellite again
    let (core_b, adapter_b) = (fixture.satellite.core, fixture.satellite.lz_adapter);
    let err = fixture
        .b_mut()
        .bridge_out(adapter_b, core_b, bob, tokens(1), transfer_id)
        .unwrap_err();
    assert!(matches!(err, BridgeError::TransferReplay(id) if id == transfer_id));

    // outbound on the canonical chain, so it can never arrive there
    let (core_a, adapter_a) = (fixture.canonical.core, fixture.canonical.ccip_adapter);
    let err = fixture
        .a_mut()
        .bridge_in(adapter_a, core_a, bob, tokens(1), transfer_id, B256::repeat_byte(9))
        .unwrap_err();
    assert!(matches!(err, BridgeError::TransferReplay(id) if id == transfer_id));

    assert!(fixture
        .a()
        .core(core_a)
        .unwrap()
        .transfer_settled(&transfer_id));
}

#[test]
fn test_consumed_transport_id_is_rejected_for_a_new_transfer() {
    let mut fixture = TwoChainFixture::new().unwrap();
    let (sender, bob) = (fixture.owner_a, fixture.bob);
    fixture.approve_core(sender, tokens(5)).unwrap();
    let params = fixture.ccip_to_b(bob, tokens(5), B256::ZERO);
    let receipt = fixture.send_ccip_from_a(sender, &params).unwrap();
    fixture.mesh.relay_all();

    let (core_b, adapter_b) = (fixture.satellite.core, fixture.satellite.ccip_adapter);
    let err = fixture
        .b_mut()
        .bridge_in(
            adapter_b,
            core_b,
            bob,
            tokens(1),
            B256::repeat_byte(0x42),
            receipt.delivery_id,
        )
        .unwrap_err();

    assert!(matches!(err, BridgeError::TransportReplay(id) if id == receipt.delivery_id));
    assert_eq!(fixture.balance_b(bob), tokens(5));
}

#[test]
fn test_unauthorized_caller_cannot_touch_custody() {
    let mut fixture = TwoChainFixture::new().unwrap();
    let (core, owner) = (fixture.canonical.core, fixture.owner_a);

    let err = fixture
        .a_mut()
        .bridge_in(owner, core, owner, tokens(1), B256::repeat_byte(1), B256::repeat_byte(2))
        .unwrap_err();

    assert!(matches!(err, BridgeError::OnlyAdapter(caller) if caller == owner));
}

#[test]
fn test_satellite_mint_overflow_reverts_without_wrapping_supply() {
    let mut fixture = TwoChainFixture::new().unwrap();
    let bob = fixture.bob;
    let (core_b, adapter_b, asset_b) = (
        fixture.satellite.core,
        fixture.satellite.lz_adapter,
        fixture.satellite.asset,
    );

    fixture
        .b_mut()
        .bridge_in(
            adapter_b,
            core_b,
            bob,
            U256::MAX,
            B256::repeat_byte(0x01),
            B256::repeat_byte(0x11),
        )
        .unwrap();
    let before = fixture.b().state().clone();

    let (transfer_id, transport_id) = (B256::repeat_byte(0x03), B256::repeat_byte(0x14));
    let err = fixture
        .b_mut()
        .bridge_in(
            adapter_b,
            core_b,
            bob,
            U256::from(1u64),
            transfer_id,
            transport_id,
        )
        .unwrap_err();

    assert!(matches!(
        err,
        BridgeError::ArithmeticOverflow { account, .. } if account == bob
    ));
    assert_eq!(*fixture.b().state(), before);
    assert_eq!(fixture.b().total_supply(asset_b), U256::MAX);
    assert_eq!(fixture.balance_b(bob), U256::MAX);
    let core = fixture.b().core(core_b).unwrap();
    assert!(!core.transfer_settled(&transfer_id));
    assert!(!core.inbound_transport_ids(&transport_id));
}
