//! PNML (PT-net flavor) parsing. Consumes the
//! `http://www.pnml.org/version-2009/grammar/ptnet` dialect and produces a
//! [`PetriNet`] via [`PetriNetBuilder`], or a structured [`ParseError`]
//! naming the offending element.

use super::{PetriNet, PetriNetBuilder};
use crate::error::ParseError;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct Document {
    net: Option<NetElement>,
}

#[derive(Debug, Deserialize, Default)]
struct NetElement {
    #[serde(rename = "place", default)]
    places: Vec<PlaceElement>,
    #[serde(rename = "transition", default)]
    transitions: Vec<TransitionElement>,
    #[serde(rename = "arc", default)]
    arcs: Vec<ArcElement>,
}

#[derive(Debug, Deserialize)]
struct PlaceElement {
    #[serde(rename = "@id")]
    id: Option<String>,
    name: Option<TextField>,
    #[serde(rename = "initialMarking")]
    initial_marking: Option<TextField>,
}

#[derive(Debug, Deserialize)]
struct TransitionElement {
    #[serde(rename = "@id")]
    id: Option<String>,
    name: Option<TextField>,
}

#[derive(Debug, Deserialize)]
struct ArcElement {
    #[serde(rename = "@id")]
    id: Option<String>,
    #[serde(rename = "@source")]
    source: Option<String>,
    #[serde(rename = "@target")]
    target: Option<String>,
    inscription: Option<TextField>,
}

#[derive(Debug, Deserialize)]
struct TextField {
    text: Option<String>,
}

impl TextField {
    fn as_str(&self) -> Option<&str> {
        self.text.as_deref()
    }
}

/// Parses the PNML document at `path` and builds a fully-validated
/// [`PetriNet`]. The parser is deliberately stricter than the original
/// Python prototype's tolerant `verify_consistency`: every violation of
/// §3's invariants is a hard [`ParseError`], except isolated transitions,
/// which remain soft warnings (logged, not raised).
pub fn parse_pnml_file(path: &Path) -> Result<PetriNet, ParseError> {
    let contents =
        std::fs::read_to_string(path).map_err(|e| ParseError::Xml(e.to_string()))?;
    parse_pnml_str(&contents)
}

/// Parses PNML from an in-memory string, as used directly by tests and by
/// [`parse_pnml_file`].
pub fn parse_pnml_str(contents: &str) -> Result<PetriNet, ParseError> {
    let document: Document =
        quick_xml::de::from_str(contents).map_err(|e| ParseError::Xml(e.to_string()))?;
    let net = document.net.ok_or(ParseError::MissingNet)?;

    let mut builder = PetriNetBuilder::new();

    for place in &net.places {
        let id = place.id.clone().ok_or(ParseError::PlaceMissingId)?;
        let name = place.name.as_ref().and_then(TextField::as_str).map(str::to_owned);
        let initial = parse_initial_marking(&id, place.initial_marking.as_ref())?;
        builder.add_place(id, name, initial)?;
    }

    for transition in &net.transitions {
        let id = transition
            .id
            .clone()
            .ok_or(ParseError::TransitionMissingId)?;
        let name = transition
            .name
            .as_ref()
            .and_then(TextField::as_str)
            .map(str::to_owned);
        builder.add_transition(id, name)?;
    }

    for arc in &net.arcs {
        let id = arc.id.clone();
        let source = arc.source.clone();
        let target = arc.target.clone();
        let (id, source, target) = match (id, source, target) {
            (Some(id), Some(source), Some(target)) => (id, source, target),
            _ => return Err(ParseError::ArcMissingAttribute),
        };
        let weight = parse_arc_weight(&id, arc.inscription.as_ref())?;
        builder.add_arc(id, source, target, weight)?;
    }

    let net = builder.build();

    for t in net.isolated_transitions() {
        log::warn!(
            "transition {} ({}) has no incident arcs; it is treated as always enabled",
            t,
            net.transitions()[t.0].id
        );
    }

    Ok(net)
}

fn parse_initial_marking(place_id: &str, field: Option<&TextField>) -> Result<bool, ParseError> {
    let text = match field.and_then(TextField::as_str) {
        Some(text) => text.trim(),
        None => return Ok(false),
    };
    if text.is_empty() {
        return Ok(false);
    }
    match text.parse::<i64>() {
        Ok(0) => Ok(false),
        Ok(1) => Ok(true),
        _ => Err(ParseError::InvalidInitialMarking {
            place: place_id.to_owned(),
            text: text.to_owned(),
        }),
    }
}

fn parse_arc_weight(arc_id: &str, field: Option<&TextField>) -> Result<u32, ParseError> {
    let text = match field.and_then(TextField::as_str) {
        Some(text) => text.trim(),
        None => return Ok(1),
    };
    if text.is_empty() {
        return Ok(1);
    }
    match text.parse::<i64>() {
        Ok(n) if n >= 1 => Ok(n as u32),
        _ => Err(ParseError::InvalidArcWeight {
            arc: arc_id.to_owned(),
            text: text.to_owned(),
        }),
    }
}
