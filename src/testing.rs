//! Test fixtures for two-chain bridging
//!
//! [`TwoChainFixture`] deploys a canonical core on Sepolia and a satellite
//! core on Base Sepolia, each with a LayerZero adapter and a CCIP adapter,
//! peers wired in both directions. Integration tests and demos start from
//! this state instead of repeating the deployment script.

use alloy_chains::NamedChain;
use alloy_primitives::{Address, Bytes, B256, U256};

use crate::adapter::{CcipSendParams, LzSendParams, SendReceipt};
use crate::chain::Chain;
use crate::error::Result;
use crate::mesh::Mesh;
use crate::protocol::{address_to_bytes32, ChainSelector, EndpointId};
use crate::transport::FeeSchedule;

/// LayerZero endpoint id of the canonical chain
pub const CANONICAL_EID: EndpointId = EndpointId(40161);
/// LayerZero endpoint id of the satellite chain
pub const SATELLITE_EID: EndpointId = EndpointId(40245);
/// CCIP chain selector of the canonical chain
pub const CANONICAL_SELECTOR: ChainSelector = ChainSelector(16015286601757825753);
/// CCIP chain selector of the satellite chain
pub const SATELLITE_SELECTOR: ChainSelector = ChainSelector(10344971235874465080);

/// Native currency credited to every fixture account
pub const FUNDING: U256 = U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);

/// Contracts deployed on one side of the fixture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deployment {
    /// Asset ledger users hold: the token on the canonical side, the core on the satellite side
    pub asset: Address,
    pub core: Address,
    pub lz_adapter: Address,
    pub ccip_adapter: Address,
}

/// A fully wired canonical/satellite pair inside a [`Mesh`]
#[derive(Debug)]
pub struct TwoChainFixture {
    pub mesh: Mesh,
    pub owner_a: Address,
    pub owner_b: Address,
    pub alice: Address,
    pub bob: Address,
    pub canonical: Deployment,
    pub satellite: Deployment,
}

impl TwoChainFixture {
    pub const CANONICAL: NamedChain = NamedChain::Sepolia;
    pub const SATELLITE: NamedChain = NamedChain::BaseSepolia;

    /// Deploys with the default fee schedule and 100 tokens minted to `owner_a`.
    pub fn new() -> Result<Self> {
        Self::with_fees(FeeSchedule::default())
    }

    pub fn with_fees(fees: FeeSchedule) -> Result<Self> {
        let owner_a = Address::repeat_byte(0xa0);
        let owner_b = Address::repeat_byte(0xb0);
        let alice = Address::repeat_byte(0xa1);
        let bob = Address::repeat_byte(0xb1);

        let mut a = Chain::new(Self::CANONICAL);
        let mut b = Chain::new(Self::SATELLITE);
        for chain in [&mut a, &mut b] {
            for account in [owner_a, owner_b, alice, bob] {
                chain.fund(account, FUNDING)?;
            }
        }

        a.deploy_lz_endpoint(CANONICAL_EID, fees)?;
        a.deploy_ccip_router(CANONICAL_SELECTOR, fees)?;
        b.deploy_lz_endpoint(SATELLITE_EID, fees)?;
        b.deploy_ccip_router(SATELLITE_SELECTOR, fees)?;

        let supply = U256::from(100u64) * U256::from(10u64).pow(U256::from(18u64));
        let token = a.deploy_token("Token6022", "T6022", owner_a, supply)?;
        let core_a = a.deploy_canonical_core(token, owner_a)?;
        let core_b = b.deploy_satellite_core("Token6022", "T6022", owner_b)?;

        let canonical = Deployment {
            asset: token,
            core: core_a,
            lz_adapter: a.deploy_lz_adapter(core_a)?,
            ccip_adapter: a.deploy_ccip_adapter(core_a)?,
        };
        let satellite = Deployment {
            asset: core_b,
            core: core_b,
            lz_adapter: b.deploy_lz_adapter(core_b)?,
            ccip_adapter: b.deploy_ccip_adapter(core_b)?,
        };

        for (chain, owner, local) in [(&mut a, owner_a, canonical), (&mut b, owner_b, satellite)] {
            chain.set_adapter(owner, local.core, local.lz_adapter, true)?;
            chain.set_adapter(owner, local.core, local.ccip_adapter, true)?;
        }

        a.set_peer(
            owner_a,
            canonical.lz_adapter,
            SATELLITE_EID,
            address_to_bytes32(satellite.lz_adapter),
        )?;
        b.set_peer(
            owner_b,
            satellite.lz_adapter,
            CANONICAL_EID,
            address_to_bytes32(canonical.lz_adapter),
        )?;
        a.set_ccip_peer(
            owner_a,
            canonical.ccip_adapter,
            SATELLITE_SELECTOR,
            Bytes::copy_from_slice(address_to_bytes32(satellite.ccip_adapter).as_slice()),
        )?;
        b.set_ccip_peer(
            owner_b,
            satellite.ccip_adapter,
            CANONICAL_SELECTOR,
            Bytes::copy_from_slice(address_to_bytes32(canonical.ccip_adapter).as_slice()),
        )?;

        let mut mesh = Mesh::new();
        mesh.add_chain(a)?;
        mesh.add_chain(b)?;
        mesh.connect_ccip_routers()?;

        Ok(Self {
            mesh,
            owner_a,
            owner_b,
            alice,
            bob,
            canonical,
            satellite,
        })
    }

    /// The canonical chain
    pub fn a(&self) -> &Chain {
        self.chain(Self::CANONICAL)
    }

    pub fn a_mut(&mut self) -> &mut Chain {
        self.chain_mut(Self::CANONICAL)
    }

    /// The satellite chain
    pub fn b(&self) -> &Chain {
        self.chain(Self::SATELLITE)
    }

    pub fn b_mut(&mut self) -> &mut Chain {
        self.chain_mut(Self::SATELLITE)
    }

    fn chain(&self, named: NamedChain) -> &Chain {
        match self.mesh.chain(named) {
            Some(chain) => chain,
            None => unreachable!("fixture always holds {named}"),
        }
    }

    fn chain_mut(&mut self, named: NamedChain) -> &mut Chain {
        match self.mesh.chain_mut(named) {
            Some(chain) => chain,
            None => unreachable!("fixture always holds {named}"),
        }
    }

    /// Token balance on the canonical side
    pub fn balance_a(&self, account: Address) -> U256 {
        self.a().balance_of(self.canonical.asset, account)
    }

    /// Token balance on the satellite side
    pub fn balance_b(&self, account: Address) -> U256 {
        self.b().balance_of(self.satellite.asset, account)
    }

    /// Approves the canonical core to pull `amount` from `owner`.
    pub fn approve_core(&mut self, owner: Address, amount: U256) -> Result<()> {
        let (token, core) = (self.canonical.asset, self.canonical.core);
        self.a_mut().approve(owner, token, core, amount)
    }

    /// Moves canonical tokens from `owner_a` to `to`.
    pub fn give_a(&mut self, to: Address, amount: U256) -> Result<()> {
        let (owner, token) = (self.owner_a, self.canonical.asset);
        self.a_mut().transfer(owner, token, to, amount)
    }

    /// LayerZero params from the canonical side to the satellite side
    pub fn lz_to_b(
        &self,
        recipient: Address,
        amount: U256,
        user_transfer_id: B256,
    ) -> LzSendParams {
        LzSendParams::builder()
            .destination(SATELLITE_EID)
            .recipient(recipient)
            .amount(amount)
            .user_transfer_id(user_transfer_id)
            .build()
    }

    /// LayerZero params from the satellite side back to the canonical side
    pub fn lz_to_a(
        &self,
        recipient: Address,
        amount: U256,
        user_transfer_id: B256,
    ) -> LzSendParams {
        LzSendParams::builder()
            .destination(CANONICAL_EID)
            .recipient(recipient)
            .amount(amount)
            .user_transfer_id(user_transfer_id)
            .build()
    }

    pub fn ccip_to_b(
        &self,
        recipient: Address,
        amount: U256,
        user_transfer_id: B256,
    ) -> CcipSendParams {
        CcipSendParams::builder()
            .destination(SATELLITE_SELECTOR)
            .recipient(recipient)
            .amount(amount)
            .user_transfer_id(user_transfer_id)
            .build()
    }

    pub fn ccip_to_a(
        &self,
        recipient: Address,
        amount: U256,
        user_transfer_id: B256,
    ) -> CcipSendParams {
        CcipSendParams::builder()
            .destination(CANONICAL_SELECTOR)
            .recipient(recipient)
            .amount(amount)
            .user_transfer_id(user_transfer_id)
            .build()
    }

    /// Quotes and sends over LayerZero from the canonical side, paying exactly the quote.
    pub fn send_lz_from_a(
        &mut self,
        sender: Address,
        params: &LzSendParams,
    ) -> Result<SendReceipt> {
        let adapter = self.canonical.lz_adapter;
        let fee = self.a().quote_lz_send(adapter, params, false)?.native_fee;
        self.a_mut().send_with_lz(sender, adapter, params, fee)
    }

    pub fn send_lz_from_b(
        &mut self,
        sender: Address,
        params: &LzSendParams,
    ) -> Result<SendReceipt> {
        let adapter = self.satellite.lz_adapter;
        let fee = self.b().quote_lz_send(adapter, params, false)?.native_fee;
        self.b_mut().send_with_lz(sender, adapter, params, fee)
    }

    pub fn send_ccip_from_a(
        &mut self,
        sender: Address,
        params: &CcipSendParams,
    ) -> Result<SendReceipt> {
        let adapter = self.canonical.ccip_adapter;
        let fee = self.a().quote_ccip_send(adapter, sender, params)?;
        self.a_mut().send_with_ccip(sender, adapter, params, fee)
    }

    pub fn send_ccip_from_b(
        &mut self,
        sender: Address,
        params: &CcipSendParams,
    ) -> Result<SendReceipt> {
        let adapter = self.satellite.ccip_adapter;
        let fee = self.b().quote_ccip_send(adapter, sender, params)?;
        self.b_mut().send_with_ccip(sender, adapter, params, fee)
    }

    /// Canonical custody in excess of satellite supply.
    ///
    /// Zero whenever no message is in flight; a pending transfer in either
    /// direction shows up here until it is relayed.
    pub fn custody_surplus(&self) -> U256 {
        let custody = self
            .a()
            .custody_balance(self.canonical.core)
            .unwrap_or_default();
        custody.saturating_sub(self.b().total_supply(self.satellite.asset))
    }
}
