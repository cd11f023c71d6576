//! System fees for contract deployment.

use serde::{Deserialize, Serialize};

use bhp_core::Fixed8;

use crate::{error::TxResult, script::ContractProperties};

/// The GAS charged to deploy a contract. `Default` gives the network's values.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeeSchedule {
    /// Charged for every deployment
    pub deploy_base: Fixed8,
    /// Added when the contract needs storage
    pub storage: Fixed8,
    /// Added when the contract needs dynamic invocation
    pub dynamic_invoke: Fixed8,
    /// Subtracted from every system fee
    pub free_gas: Fixed8,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            deploy_base: Fixed8::from_raw(100 * 100_000_000),
            storage: Fixed8::from_raw(400 * 100_000_000),
            dynamic_invoke: Fixed8::from_raw(500 * 100_000_000),
            free_gas: Fixed8::from_raw(10 * 100_000_000),
        }
    }
}

impl FeeSchedule {
    /// The system fee for deploying a contract with `properties`. Never negative.
    pub fn deployment_fee(&self, properties: &ContractProperties) -> TxResult<Fixed8> {
        let mut fee = self.deploy_base;
        if properties.needs_storage {
            fee = fee.checked_add(self.storage)?;
        }
        if properties.needs_dynamic_invoke {
            fee = fee.checked_add(self.dynamic_invoke)?;
        }
        let fee = fee.checked_sub(self.free_gas)?;
        Ok(if fee.is_negative() { Fixed8::ZERO } else { fee })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn it_charges_for_storage_and_dynamic_invoke() {
        let cases = [
            ((false, false, false), 90),
            ((true, false, false), 490),
            ((false, true, false), 590),
            ((true, true, false), 990),
            ((true, true, true), 990),
            ((false, false, true), 90),
        ];
        let fees = FeeSchedule::default();
        for ((s, d, p), units) in cases.iter() {
            let props = ContractProperties {
                needs_storage: *s,
                needs_dynamic_invoke: *d,
                is_payable: *p,
            };
            assert_eq!(
                fees.deployment_fee(&props).unwrap(),
                Fixed8::from_units(*units).unwrap()
            );
        }
    }

    #[test]
    fn it_floors_at_zero() {
        let fees = FeeSchedule {
            free_gas: Fixed8::from_units(1000).unwrap(),
            ..Default::default()
        };
        assert_eq!(
            fees.deployment_fee(&ContractProperties::default()).unwrap(),
            Fixed8::ZERO
        );
    }

    #[test]
    fn it_loads_overrides_from_json() {
        let fees: FeeSchedule = serde_json::from_str(r#"{ "storage": "1" }"#).unwrap();
        assert_eq!(fees.storage, Fixed8::from_units(1).unwrap());
        assert_eq!(fees.deploy_base, FeeSchedule::default().deploy_base);
    }
}
