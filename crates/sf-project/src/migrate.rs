//! Scenario version migration.
//!
//! Version 0 is a document written without a `version` key.

use crate::ProjectError;
use crate::schema::Scenario;

pub const LATEST_VERSION: u32 = 1;

pub fn migrate_to_latest(mut scenario: Scenario) -> Result<Scenario, ProjectError> {
    while scenario.version < LATEST_VERSION {
        scenario = migrate_one_version(scenario)?;
    }
    Ok(scenario)
}

fn migrate_one_version(scenario: Scenario) -> Result<Scenario, ProjectError> {
    match scenario.version {
        0 => migrate_v0_to_v1(scenario),
        v => Err(ProjectError::Migration {
            what: format!("No migration path from version {}", v),
        }),
    }
}

fn migrate_v0_to_v1(mut scenario: Scenario) -> Result<Scenario, ProjectError> {
    tracing::debug!(name = %scenario.name, "migrating unversioned scenario");
    scenario.version = 1;
    Ok(scenario)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::CspPlantDef;

    fn scenario(version: u32) -> Scenario {
        Scenario {
            version,
            name: "test".to_string(),
            csp: Some(CspPlantDef::default()),
            pvwatts: None,
        }
    }

    #[test]
    fn migrate_latest_is_noop() {
        let s = scenario(LATEST_VERSION);
        assert_eq!(migrate_to_latest(s.clone()).unwrap(), s);
    }

    #[test]
    fn unversioned_documents_are_upgraded() {
        let migrated = migrate_to_latest(scenario(0)).unwrap();
        assert_eq!(migrated.version, LATEST_VERSION);
        assert_eq!(migrated.csp, Some(CspPlantDef::default()));
    }
}
