//! Mesh wiring and diagnostics against freshly deployed chains

use alloy_chains::NamedChain;
use alloy_primitives::{bytes, Address, Bytes, B256, U256};
use token6022_bridge::testing::{
    TwoChainFixture, CANONICAL_EID, CANONICAL_SELECTOR, SATELLITE_EID, SATELLITE_SELECTOR,
};
use token6022_bridge::wiring::{
    diagnose_ccip, diagnose_lz, wire_ccip, wire_lz, CcipMeshConfig, Issue, LzMeshConfig,
    WireAction,
};
use token6022_bridge::{address_to_bytes32, BridgeError, Chain, EndpointId, FeeSchedule};

const LZ_MESH: &str = r#"{
    "points": [
        { "network": "sepolia", "eid": 40161 },
        { "network": "base-sepolia", "eid": 40245 }
    ],
    "pathways": [
        {
            "a": "sepolia",
            "b": "base-sepolia",
            "a_to_b_options": "0x00030100110100000000000000000000000000030d40"
        }
    ]
}"#;

struct Unwired {
    chain: Chain,
    owner: Address,
    adapter: Address,
}

fn unwired(named: NamedChain, eid: u32, canonical: bool) -> Unwired {
    let owner = Address::repeat_byte(0x0f);
    let mut chain = Chain::new(named);
    chain
        .deploy_lz_endpoint(eid.into(), FeeSchedule::default())
        .unwrap();
    let core = if canonical {
        let token = chain
            .deploy_token("Token6022", "T6022", owner, U256::from(100u64))
            .unwrap();
        chain.deploy_canonical_core(token, owner).unwrap()
    } else {
        chain.deploy_satellite_core("Token6022", "T6022", owner).unwrap()
    };
    let adapter = chain.deploy_lz_adapter(core).unwrap();
    Unwired {
        chain,
        owner,
        adapter,
    }
}

fn lz_config(a: &Unwired, b: &Unwired) -> LzMeshConfig {
    let mut config = LzMeshConfig::from_json(LZ_MESH).unwrap();
    config.set_address("sepolia", a.adapter).unwrap();
    config.set_address("base-sepolia", b.adapter).unwrap();
    config
}

#[test]
fn test_dry_run_plans_without_writing() {
    let mut a = unwired(NamedChain::Sepolia, 40161, true);
    let b = unwired(NamedChain::BaseSepolia, 40245, false);
    let config = lz_config(&a, &b);
    let before = a.chain.state().clone();

    let plan = wire_lz(&mut a.chain, a.owner, &config, true).unwrap();

    assert!(plan.dry_run);
    assert_eq!(
        plan.actions,
        vec![
            WireAction::SetPeer {
                eid: SATELLITE_EID,
                peer: address_to_bytes32(b.adapter),
            },
            WireAction::SetLzSendOptions {
                eid: SATELLITE_EID,
                options: bytes!("00030100110100000000000000000000000000030d40"),
            },
        ]
    );
    assert!(plan.to_string().contains("(dry-run)"));
    assert_eq!(*a.chain.state(), before);
}

#[test]
fn test_wiring_is_idempotent() {
    let mut a = unwired(NamedChain::Sepolia, 40161, true);
    let mut b = unwired(NamedChain::BaseSepolia, 40245, false);
    let config = lz_config(&a, &b);

    let first_a = wire_lz(&mut a.chain, a.owner, &config, false).unwrap();
    let first_b = wire_lz(&mut b.chain, b.owner, &config, false).unwrap();
    assert_eq!(first_a.actions.len(), 2);
    // no options were configured for the reverse direction
    assert_eq!(first_b.actions.len(), 1);

    let adapter = a.chain.lz_adapter(a.adapter).unwrap();
    assert_eq!(adapter.peers(SATELLITE_EID), address_to_bytes32(b.adapter));
    assert_eq!(
        adapter.lz_send_options(SATELLITE_EID),
        bytes!("00030100110100000000000000000000000000030d40")
    );
    assert_eq!(
        b.chain.lz_adapter(b.adapter).unwrap().peers(CANONICAL_EID),
        address_to_bytes32(a.adapter)
    );

    let logged = a.chain.logs().len();
    let second = wire_lz(&mut a.chain, a.owner, &config, false).unwrap();
    assert!(second.is_empty());
    assert_eq!(second.unchanged, 2);
    assert_eq!(a.chain.logs().len(), logged);
}

#[test]
fn test_wiring_requires_core_owner() {
    let mut a = unwired(NamedChain::Sepolia, 40161, true);
    let b = unwired(NamedChain::BaseSepolia, 40245, false);
    let config = lz_config(&a, &b);
    let stranger = Address::repeat_byte(0x99);

    let err = wire_lz(&mut a.chain, stranger, &config, false).unwrap_err();

    assert!(matches!(err, BridgeError::OnlyCoreOwner { caller, .. } if caller == stranger));
    assert!(a
        .chain
        .lz_adapter(a.adapter)
        .unwrap()
        .peers(SATELLITE_EID)
        .is_zero());
}

#[test]
fn test_wiring_rejects_mismatched_endpoint() {
    let mut a = unwired(NamedChain::Sepolia, 40161, true);
    let b = unwired(NamedChain::BaseSepolia, 40245, false);
    let mut config = lz_config(&a, &b);
    config.points[0].key = EndpointId::new(1);

    let err = wire_lz(&mut a.chain, a.owner, &config, false).unwrap_err();

    assert!(matches!(err, BridgeError::InvalidConfig(_)));
}

#[test]
fn test_wiring_requires_addresses() {
    let mut a = unwired(NamedChain::Sepolia, 40161, true);
    let config = LzMeshConfig::from_json(LZ_MESH).unwrap();

    let err = wire_lz(&mut a.chain, a.owner, &config, false).unwrap_err();

    assert!(matches!(err, BridgeError::InvalidConfig(msg) if msg.contains("sepolia")));
}

#[test]
fn test_ccip_wiring_treats_raw_and_padded_peers_alike() {
    let mut fixture = TwoChainFixture::new().unwrap();
    let (owner, adapter) = (fixture.owner_a, fixture.canonical.ccip_adapter);
    let remote = fixture.satellite.ccip_adapter;

    // replace the padded peer with the raw address form
    fixture
        .a_mut()
        .set_ccip_peer(
            owner,
            adapter,
            SATELLITE_SELECTOR,
            Bytes::copy_from_slice(remote.as_slice()),
        )
        .unwrap();

    let json = format!(
        r#"{{
            "points": [
                {{ "network": "sepolia", "chainSelector": "{}", "address": "{}" }},
                {{ "network": "base-sepolia", "chainSelector": "{}", "address": "{}" }}
            ],
            "pathways": [
                {{ "a": "sepolia", "b": "base-sepolia", "a_to_b_options": "0x97a657c9" }}
            ]
        }}"#,
        CANONICAL_SELECTOR, adapter, SATELLITE_SELECTOR, remote
    );
    let config = CcipMeshConfig::from_json(&json).unwrap();

    let plan = wire_ccip(fixture.a_mut(), owner, &config, false).unwrap();

    assert_eq!(
        plan.actions,
        vec![WireAction::SetCcipExtraArgs {
            selector: SATELLITE_SELECTOR,
            extra_args: bytes!("97a657c9"),
        }]
    );
    assert_eq!(plan.unchanged, 1);
}

#[test]
fn test_diagnosis_of_wired_fixture_is_healthy() {
    let fixture = TwoChainFixture::new().unwrap();

    let lz = diagnose_lz(
        fixture.a(),
        fixture.canonical.lz_adapter,
        SATELLITE_EID,
        Some(fixture.satellite.lz_adapter),
    )
    .unwrap();
    assert!(lz.is_healthy(), "{:?}", lz.issues);
    assert_eq!(lz.core, fixture.canonical.core);
    assert_eq!(lz.core_owner, fixture.owner_a);
    assert_eq!(lz.quote, Some(U256::from(1u64)));

    let ccip = diagnose_ccip(
        fixture.b(),
        fixture.satellite.ccip_adapter,
        CANONICAL_SELECTOR,
        Some(fixture.canonical.ccip_adapter),
    )
    .unwrap();
    assert!(ccip.is_healthy(), "{:?}", ccip.issues);
    assert!(ccip.peer.is_some_and(|peer| peer.is_native()));
}

#[test]
fn test_diagnosis_reports_missing_configuration() {
    let mut fixture = TwoChainFixture::new().unwrap();
    let (owner, core, adapter) = (
        fixture.owner_b,
        fixture.satellite.core,
        fixture.satellite.lz_adapter,
    );
    fixture
        .b_mut()
        .set_adapter(owner, core, adapter, false)
        .unwrap();
    fixture
        .b_mut()
        .set_peer(owner, adapter, CANONICAL_EID, B256::ZERO)
        .unwrap();

    let diagnosis = diagnose_lz(fixture.b(), adapter, CANONICAL_EID, None).unwrap();

    assert_eq!(
        diagnosis.issues,
        vec![Issue::AdapterNotAuthorized, Issue::PeerNotSet]
    );
    assert_eq!(diagnosis.quote, None);
}

#[test]
fn test_diagnosis_of_unknown_adapter_fails() {
    let fixture = TwoChainFixture::new().unwrap();
    let stray = Address::repeat_byte(0x77);

    let err = diagnose_ccip(fixture.a(), stray, SATELLITE_SELECTOR, None).unwrap_err();

    assert!(matches!(err, BridgeError::UnknownContract(address) if address == stray));
}
