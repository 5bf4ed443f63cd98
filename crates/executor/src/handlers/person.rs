//! Person command handlers.
//!
//! This module implements handlers for the 5 registry commands by dispatching
//! directly to the person registry via `bridge::Primitives`.

use std::sync::Arc;

use population_core::Person;

use crate::bridge::Primitives;
use crate::convert::convert_result;
use crate::{Output, Result};

/// Handle AddPerson command.
pub fn add_person(p: &Arc<Primitives>, person: Person) -> Result<Output> {
    convert_result(p.registry.add_person(&person))?;
    Ok(Output::Unit)
}

/// Handle ChangePersonData command.
pub fn change_person_data(p: &Arc<Primitives>, person: Person) -> Result<Output> {
    convert_result(p.registry.change_person_data(&person))?;
    Ok(Output::Unit)
}

/// Handle GetPerson command.
pub fn get_person(p: &Arc<Primitives>, id: String) -> Result<Output> {
    let person = convert_result(p.registry.get_person(&id))?;
    Ok(Output::Person(person))
}

/// Handle GetPersonHistory command.
pub fn get_person_history(p: &Arc<Primitives>, id: String) -> Result<Output> {
    let history = convert_result(p.registry.get_person_history(&id))?;
    Ok(Output::History(history))
}

/// Handle PersonExists command.
pub fn person_exists(p: &Arc<Primitives>, id: String) -> Result<Output> {
    let exists = convert_result(p.registry.person_exists(&id))?;
    Ok(Output::Bool(exists))
}
