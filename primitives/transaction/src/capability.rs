use bitflags::bitflags;

bitflags! {
    /// Capability flags over a `Currency::type` bitmask (spec §3).
    ///
    /// A closed set of six bits; `CapabilityValidator` (mempool crate)
    /// iterates this exact set in this exact order for every validation
    /// call (spec §4.1, "Ordering and tie-breaks").
    #[cfg_attr(feature = "serde-derive", derive(serde::Serialize, serde::Deserialize))]
    pub struct CapabilityFlags: u32 {
        const EXCHANGEABLE = 0x01;
        const CONTROLLABLE = 0x02;
        const RESERVABLE   = 0x04;
        const CLAIMABLE    = 0x08;
        const MINTABLE     = 0x10;
        const SHUFFLEABLE  = 0x20;
    }
}
