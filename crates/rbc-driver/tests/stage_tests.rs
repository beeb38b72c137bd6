//! Unit stage machine behavior.

use rbc_binder::NamespaceId;
use rbc_driver::{Unit, UnitStage};
use std::path::PathBuf;

fn unit() -> Unit {
    Unit::new(PathBuf::from("main/app.rbc"), NamespaceId::ROOT)
}

#[test]
fn stages_are_strictly_ordered() {
    assert!(UnitStage::Init < UnitStage::Read);
    assert!(UnitStage::Read < UnitStage::Lexed);
    assert!(UnitStage::Lexed < UnitStage::Parsed);
    assert!(UnitStage::Parsed < UnitStage::PartiallyResolved);
    assert!(UnitStage::PartiallyResolved < UnitStage::FullyResolved);
}

#[test]
fn units_start_at_init() {
    let unit = unit();
    assert_eq!(unit.stage(), UnitStage::Init);
    assert!(unit.assert_stage(UnitStage::Init).is_ok());
    assert!(unit.assert_stage(UnitStage::Read).is_err());
}

#[test]
fn advancing_moves_forward_only() {
    let mut unit = unit();
    unit.advance_to(UnitStage::Read).unwrap();
    unit.advance_to(UnitStage::Parsed).unwrap();
    assert_eq!(unit.stage(), UnitStage::Parsed);

    // No downgrades, no self-transitions.
    assert!(unit.advance_to(UnitStage::Read).is_err());
    assert!(unit.advance_to(UnitStage::Parsed).is_err());
    assert_eq!(unit.stage(), UnitStage::Parsed);
}

#[test]
fn stage_names_match_the_pipeline_vocabulary() {
    assert_eq!(UnitStage::Init.name(), "INIT");
    assert_eq!(UnitStage::PartiallyResolved.name(), "PARTIALLY_RESOLVED");
    assert_eq!(UnitStage::FullyResolved.to_string(), "FULLY_RESOLVED");
}
