use ms_primitives::policy;
use ms_transaction::{Attachment, CapabilityFlags, Currency, Transaction, ValidationError};

/// The Monetary System transaction subtypes §4.1's rules discriminate on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Issuance,
    Transfer,
    PublishOffer,
    ExchangeBuy,
    ExchangeSell,
    ReserveIncrease,
    ReserveClaim,
    Minting,
    /// Not a Monetary System operation; none of the per-flag rules fire.
    Other,
}

impl Op {
    fn of(attachment: &Attachment) -> Self {
        match attachment {
            Attachment::Ordinary => Op::Other,
            Attachment::Issuance { .. } => Op::Issuance,
            Attachment::Transfer { .. } => Op::Transfer,
            Attachment::PublishExchangeOffer { .. } => Op::PublishOffer,
            Attachment::ExchangeBuy { .. } => Op::ExchangeBuy,
            Attachment::ExchangeSell { .. } => Op::ExchangeSell,
            Attachment::ReserveIncrease { .. } => Op::ReserveIncrease,
            Attachment::ReserveClaim { .. } => Op::ReserveClaim,
            Attachment::Minting { .. } => Op::Minting,
        }
    }

    fn is_exchange_or_offer(self) -> bool {
        matches!(self, Op::ExchangeBuy | Op::ExchangeSell | Op::PublishOffer)
    }
}

struct ValidationCtx<'a> {
    currency: Option<&'a Currency>,
    tx: &'a Transaction,
    validators: CapabilityFlags,
    current_height: u32,
    op: Op,
}

type RuleFn = for<'a> fn(&ValidationCtx<'a>) -> Result<(), ValidationError>;

struct CapabilityRule {
    flag: CapabilityFlags,
    on_present: RuleFn,
    on_missing: RuleFn,
}

fn ok(_ctx: &ValidationCtx) -> Result<(), ValidationError> {
    Ok(())
}

// --- EXCHANGEABLE ---------------------------------------------------------

fn exchangeable_present(ctx: &ValidationCtx) -> Result<(), ValidationError> {
    if ctx.op == Op::Issuance && ctx.validators.contains(CapabilityFlags::CLAIMABLE) {
        return Err(ValidationError::NotValid("exchangeable cannot be claimed"));
    }
    Ok(())
}

fn exchangeable_missing(ctx: &ValidationCtx) -> Result<(), ValidationError> {
    if ctx.op == Op::Issuance && !ctx.validators.contains(CapabilityFlags::CLAIMABLE) {
        return Err(ValidationError::NotValid(
            "currency must be exchangeable or claimable",
        ));
    }
    if ctx.op.is_exchange_or_offer() {
        return Err(ValidationError::NotValid("not exchangeable"));
    }
    Ok(())
}

// --- CONTROLLABLE ----------------------------------------------------------

fn controllable_present(ctx: &ValidationCtx) -> Result<(), ValidationError> {
    match ctx.op {
        Op::Transfer => {
            let issuer = ctx.currency.map(|c| c.account_id);
            if issuer != Some(ctx.tx.sender) && issuer != Some(ctx.tx.recipient) {
                return Err(ValidationError::NotValid(
                    "controllable currency transfer restricted to the issuer",
                ));
            }
        }
        Op::PublishOffer => {
            if ctx.currency.map(|c| c.account_id) != Some(ctx.tx.sender) {
                return Err(ValidationError::NotValid(
                    "controllable currency offer restricted to the issuer",
                ));
            }
        }
        _ => {}
    }
    Ok(())
}

// --- RESERVABLE --------------------------------------------------------------

fn reservable_present(ctx: &ValidationCtx) -> Result<(), ValidationError> {
    match (&ctx.op, &ctx.tx.attachment) {
        (Op::Issuance, Attachment::Issuance { issuance_height, .. }) => {
            if *issuance_height <= ctx.current_height {
                return Err(ValidationError::NotCurrentlyValid(
                    "issuance height must be in the future",
                ));
            }
        }
        (Op::ReserveIncrease, _) => {
            if ctx.currency.map(|c| c.is_active(ctx.current_height)).unwrap_or(false) {
                return Err(ValidationError::NotCurrentlyValid(
                    "cannot increase reserve for active currency",
                ));
            }
        }
        _ => {}
    }
    Ok(())
}

fn reservable_missing(ctx: &ValidationCtx) -> Result<(), ValidationError> {
    match (&ctx.op, &ctx.tx.attachment) {
        (Op::ReserveIncrease, _) => return Err(ValidationError::NotValid("not reservable")),
        (Op::Issuance, Attachment::Issuance { issuance_height, .. }) => {
            if *issuance_height != 0 {
                return Err(ValidationError::NotValid(
                    "issuance height must be zero for a non-reservable currency",
                ));
            }
        }
        _ => {}
    }
    Ok(())
}

// --- CLAIMABLE -----------------------------------------------------------

fn claimable_present(ctx: &ValidationCtx) -> Result<(), ValidationError> {
    match (&ctx.op, &ctx.tx.attachment) {
        (Op::Issuance, Attachment::Issuance { current_supply, .. }) => {
            if !ctx.validators.contains(CapabilityFlags::RESERVABLE) || *current_supply != 0 {
                return Err(ValidationError::NotValid("claimable must be reservable"));
            }
        }
        (Op::ReserveClaim, _) => {
            let active = ctx.currency.map(|c| c.is_active(ctx.current_height)).unwrap_or(false);
            if !active {
                return Err(ValidationError::NotCurrentlyValid("currency is not active"));
            }
        }
        _ => {}
    }
    Ok(())
}

fn claimable_missing(ctx: &ValidationCtx) -> Result<(), ValidationError> {
    if ctx.op == Op::ReserveClaim {
        return Err(ValidationError::NotValid("not claimable"));
    }
    Ok(())
}

// --- MINTABLE --------------------------------------------------------------

fn mintable_present(ctx: &ValidationCtx) -> Result<(), ValidationError> {
    if let (Op::Issuance, Attachment::Issuance {
        algorithm,
        min_difficulty,
        max_difficulty,
        ..
    }) = (&ctx.op, &ctx.tx.attachment)
    {
        if !algorithm.is_known() {
            return Err(ValidationError::NotValid("unknown minting algorithm"));
        }
        if *min_difficulty == 0 || min_difficulty > max_difficulty {
            return Err(ValidationError::NotValid("invalid minting difficulty bounds"));
        }
    }
    Ok(())
}

fn mintable_missing(ctx: &ValidationCtx) -> Result<(), ValidationError> {
    match (&ctx.op, &ctx.tx.attachment) {
        (Op::Issuance, Attachment::Issuance {
            algorithm,
            min_difficulty,
            max_difficulty,
            ..
        }) => {
            if *min_difficulty != 0 || *max_difficulty != 0 || algorithm.is_known() {
                return Err(ValidationError::NotValid(
                    "minting fields must be zero for a non-mintable currency",
                ));
            }
        }
        (Op::Minting, _) => return Err(ValidationError::NotValid("not mintable")),
        _ => {}
    }
    Ok(())
}

// --- SHUFFLEABLE -----------------------------------------------------------

fn shuffleable_present(_ctx: &ValidationCtx) -> Result<(), ValidationError> {
    Err(ValidationError::NotYetEnabled("shuffling"))
}

/// The fixed dispatch table (spec §9, "Capability dispatch"): one row per
/// flag in spec §4.1's enumeration order, each with its present/missing
/// rule. A single array keyed by flag, replacing the teacher's (and the
/// original protocol's) per-enum-constant method overrides.
const RULES: [CapabilityRule; 6] = [
    CapabilityRule {
        flag: CapabilityFlags::EXCHANGEABLE,
        on_present: exchangeable_present,
        on_missing: exchangeable_missing,
    },
    CapabilityRule {
        flag: CapabilityFlags::CONTROLLABLE,
        on_present: controllable_present,
        on_missing: ok,
    },
    CapabilityRule {
        flag: CapabilityFlags::RESERVABLE,
        on_present: reservable_present,
        on_missing: reservable_missing,
    },
    CapabilityRule {
        flag: CapabilityFlags::CLAIMABLE,
        on_present: claimable_present,
        on_missing: claimable_missing,
    },
    CapabilityRule {
        flag: CapabilityFlags::MINTABLE,
        on_present: mintable_present,
        on_missing: mintable_missing,
    },
    CapabilityRule {
        flag: CapabilityFlags::SHUFFLEABLE,
        on_present: shuffleable_present,
        on_missing: ok,
    },
];

/// Validates a transaction against a currency's capability flag set (spec
/// §4.1, C2).
pub struct CapabilityValidator;

impl CapabilityValidator {
    pub fn validate(
        current_height: u32,
        type_bits: CapabilityFlags,
        currency: Option<&Currency>,
        tx: &Transaction,
    ) -> Result<(), ValidationError> {
        if current_height < policy::MONETARY_SYSTEM_BLOCK {
            return Err(ValidationError::NotYetEnabled("monetary system"));
        }

        if tx.amount != ms_primitives::Coin::ZERO {
            return Err(ValidationError::NotValid("currency tx amount must be 0"));
        }

        let validators = type_bits;
        if validators.is_empty() {
            return Err(ValidationError::NotValid("currency type not specified"));
        }

        let ctx = ValidationCtx {
            currency,
            tx,
            validators,
            current_height,
            op: Op::of(&tx.attachment),
        };

        for rule in &RULES {
            let result = if validators.contains(rule.flag) {
                (rule.on_present)(&ctx)
            } else {
                (rule.on_missing)(&ctx)
            };
            result?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ms_primitives::{Address, Coin};
    use ms_transaction::attachment::MintingAlgorithm;
    use ms_transaction::transaction::Transaction as Tx;

    fn issuance_tx(currency_type: CapabilityFlags, issuance_height: u32, current_supply: u64) -> Tx {
        Tx::build(
            Address::from_u64(1),
            Address::from_u64(1),
            Coin::ZERO,
            Coin::from_u64(1),
            1_700_000_000,
            60,
            1,
            None,
            Attachment::Issuance {
                currency_type,
                name: "gold".to_string(),
                code: "GLD".to_string(),
                description: String::new(),
                issuance_height,
                current_supply,
                min_difficulty: 0,
                max_difficulty: 0,
                algorithm: MintingAlgorithm::Unknown(0),
            },
            vec![],
        )
    }

    #[test]
    fn s1_exchangeable_and_claimable_conflict() {
        let flags = CapabilityFlags::EXCHANGEABLE | CapabilityFlags::CLAIMABLE;
        let tx = issuance_tx(flags, 0, 0);
        let err = CapabilityValidator::validate(1000, flags, None, &tx).unwrap_err();
        assert_eq!(err, ValidationError::NotValid("exchangeable cannot be claimed"));
    }

    #[test]
    fn s2_reservable_activation_height() {
        let flags = CapabilityFlags::RESERVABLE | CapabilityFlags::EXCHANGEABLE;
        let tx_same_height = issuance_tx(flags, 1000, 0);
        let err =
            CapabilityValidator::validate(1000, flags, None, &tx_same_height).unwrap_err();
        assert_eq!(
            err,
            ValidationError::NotCurrentlyValid("issuance height must be in the future")
        );

        let tx_future = issuance_tx(flags, 1001, 0);
        assert!(CapabilityValidator::validate(1000, flags, None, &tx_future).is_ok());
    }

    #[test]
    fn s3_claimable_requires_reservable() {
        let flags = CapabilityFlags::CLAIMABLE;
        let tx = issuance_tx(flags, 0, 0);
        let err = CapabilityValidator::validate(1000, flags, None, &tx).unwrap_err();
        assert_eq!(err, ValidationError::NotValid("claimable must be reservable"));

        let flags_ok = CapabilityFlags::CLAIMABLE | CapabilityFlags::RESERVABLE;
        let tx_ok = issuance_tx(flags_ok, 1001, 0);
        assert!(CapabilityValidator::validate(1000, flags_ok, None, &tx_ok).is_ok());
    }

    #[test]
    fn s4_mintable_difficulty_bounds() {
        let flags = CapabilityFlags::MINTABLE | CapabilityFlags::EXCHANGEABLE;
        let bad = Tx::build(
            Address::from_u64(1),
            Address::from_u64(1),
            Coin::ZERO,
            Coin::from_u64(1),
            1_700_000_000,
            60,
            1,
            None,
            Attachment::Issuance {
                currency_type: flags,
                name: "gold".to_string(),
                code: "GLD".to_string(),
                description: String::new(),
                issuance_height: 0,
                current_supply: 0,
                min_difficulty: 0,
                max_difficulty: 10,
                algorithm: MintingAlgorithm::Sha256,
            },
            vec![],
        );
        let err = CapabilityValidator::validate(1000, flags, None, &bad).unwrap_err();
        assert_eq!(err, ValidationError::NotValid("invalid minting difficulty bounds"));

        let good = Tx::build(
            Address::from_u64(1),
            Address::from_u64(1),
            Coin::ZERO,
            Coin::from_u64(1),
            1_700_000_000,
            60,
            1,
            None,
            Attachment::Issuance {
                currency_type: flags,
                name: "gold".to_string(),
                code: "GLD".to_string(),
                description: String::new(),
                issuance_height: 0,
                current_supply: 0,
                min_difficulty: 1,
                max_difficulty: 10,
                algorithm: MintingAlgorithm::Sha256,
            },
            vec![],
        );
        assert!(CapabilityValidator::validate(1000, flags, None, &good).is_ok());
    }

    #[test]
    fn shuffleable_is_always_rejected() {
        let flags = CapabilityFlags::SHUFFLEABLE | CapabilityFlags::EXCHANGEABLE;
        let tx = issuance_tx(flags, 0, 0);
        let err = CapabilityValidator::validate(1000, flags, None, &tx).unwrap_err();
        assert_eq!(err, ValidationError::NotYetEnabled("shuffling"));
    }

    #[test]
    fn below_monetary_system_height_is_disabled() {
        let flags = CapabilityFlags::EXCHANGEABLE;
        let tx = issuance_tx(flags, 0, 0);
        let err = CapabilityValidator::validate(0, flags, None, &tx).unwrap_err();
        assert_eq!(err, ValidationError::NotYetEnabled("monetary system"));
    }
}
