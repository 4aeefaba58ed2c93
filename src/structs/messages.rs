use serde::{Deserialize, Serialize};

use crate::{Instance, Message, Relation, Result, Witness};

/// All the messages of a statement gathered in one structure, convenient to
/// convert a full statement to or from JSON or YAML.
#[derive(Clone, Default, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct Messages {
    pub instances: Vec<Instance>,
    pub witnesses: Vec<Witness>,
    pub relations: Vec<Relation>,
}

impl Messages {
    pub fn push_message(&mut self, msg: &Message) {
        match msg {
            Message::Instance(i) => self.instances.push(i.clone()),
            Message::Witness(w) => self.witnesses.push(w.clone()),
            Message::Relation(r) => self.relations.push(r.clone()),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Messages> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn from_yaml(yaml: &str) -> Result<Messages> {
        Ok(serde_yaml::from_str(yaml)?)
    }
}

#[test]
fn test_statement_json_roundtrip() -> Result<()> {
    use crate::test_statements::*;

    let mut messages = Messages::default();
    messages.push_message(&Message::Instance(example_instance()));
    messages.push_message(&Message::Witness(example_witness()));
    messages.push_message(&Message::Relation(example_relation()));

    let json = messages.to_json()?;
    let decoded = Messages::from_json(&json)?;
    assert_eq!(decoded, messages);

    let yaml = messages.to_yaml()?;
    let decoded = Messages::from_yaml(&yaml)?;
    assert_eq!(decoded, messages);

    Ok(())
}
