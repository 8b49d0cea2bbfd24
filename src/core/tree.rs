/// Immutable, ordered, attributed tree nodes — the shared substrate of
/// plots and stories.
///
/// A node is a kind tag, an ordered child list, and a map from roles to
/// values. Each kind declares the roles it accepts; every transformation
/// returns a new node.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{self, Write as _};
use thiserror::Error;

use crate::schema::object::{Group, ObjectRef};
use crate::schema::state::StateRef;

/// Named slot on a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    Subject,
    Object,
    Object2,
    Bystanders,
    /// Participants who leave when the development ends.
    Exeunt,
    /// Participant made unavailable from here on.
    Disqualified,
    /// Participant made available again.
    Requalified,
    Setting,
    Goons,
    Abductee,
    AbducteeLocation,
}

impl Role {
    pub const ALL: [Role; 11] = [
        Role::Subject,
        Role::Object,
        Role::Object2,
        Role::Bystanders,
        Role::Exeunt,
        Role::Disqualified,
        Role::Requalified,
        Role::Setting,
        Role::Goons,
        Role::Abductee,
        Role::AbducteeLocation,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Subject => "subject",
            Self::Object => "object",
            Self::Object2 => "object2",
            Self::Bystanders => "bystanders",
            Self::Exeunt => "exeunt",
            Self::Disqualified => "disqualified",
            Self::Requalified => "requalified",
            Self::Setting => "setting",
            Self::Goons => "goons",
            Self::Abductee => "abductee",
            Self::AbducteeLocation => "abductee_location",
        }
    }

    /// Parses a role name, accepting the `obj`, `sub` and `subj` short forms.
    pub fn parse(name: &str) -> Option<Role> {
        let name = match name {
            "obj" => "object",
            "sub" | "subj" => "subject",
            other => other,
        };
        Self::ALL.iter().copied().find(|r| r.name() == name)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("{node} does not declare role '{role}'")]
    UnknownRole { node: &'static str, role: Role },
}

/// What a role can hold.
#[derive(Clone, PartialEq)]
pub enum Value {
    Object(ObjectRef),
    Group(Group),
    State(StateRef),
}

impl Value {
    /// The underlying object of an object or state value.
    pub fn object(&self) -> Option<&ObjectRef> {
        match self {
            Self::Object(o) => Some(o),
            Self::State(s) => Some(&s.object),
            Self::Group(_) => None,
        }
    }

    pub fn state(&self) -> Option<&StateRef> {
        match self {
            Self::State(s) => Some(s),
            _ => None,
        }
    }

    /// Every object this value stands for: a group's members or the single object.
    pub fn members(&self) -> Vec<ObjectRef> {
        match self {
            Self::Group(g) => g.members().to_vec(),
            Self::Object(o) => vec![o.clone()],
            Self::State(s) => vec![s.object.clone()],
        }
    }
}

impl From<ObjectRef> for Value {
    fn from(o: ObjectRef) -> Self {
        Self::Object(o)
    }
}

impl From<&ObjectRef> for Value {
    fn from(o: &ObjectRef) -> Self {
        Self::Object(o.clone())
    }
}

impl From<Group> for Value {
    fn from(g: Group) -> Self {
        Self::Group(g)
    }
}

impl From<StateRef> for Value {
    fn from(s: StateRef) -> Self {
        Self::State(s)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Object(o) => write!(f, "{:?}", o),
            Self::Group(g) => f.debug_list().entries(g.members()).finish(),
            Self::State(s) => write!(f, "{:?}", s),
        }
    }
}

/// Behaviour shared by every node kind.
pub trait NodeKind: Clone + fmt::Debug + PartialEq {
    /// Human-readable kind name used in diagnostics.
    fn label(&self) -> &'static str;

    /// Roles this kind accepts.
    fn roles(&self) -> &'static [Role];

    /// Sequence kinds splice same-kind children into themselves on flatten.
    fn is_sequence(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node<K> {
    kind: K,
    children: Vec<Node<K>>,
    attrs: BTreeMap<Role, Value>,
}

impl<K: NodeKind> Node<K> {
    pub fn new(kind: K) -> Self {
        Self {
            kind,
            children: Vec::new(),
            attrs: BTreeMap::new(),
        }
    }

    /// A node of `kind` holding `children`.
    pub fn parent(kind: K, children: Vec<Node<K>>) -> Self {
        Self {
            kind,
            children,
            attrs: BTreeMap::new(),
        }
    }

    pub fn kind(&self) -> &K {
        &self.kind
    }

    pub fn children(&self) -> &[Node<K>] {
        &self.children
    }

    pub fn declares(&self, role: Role) -> bool {
        self.kind.roles().contains(&role)
    }

    /// The value in `role`; `Ok(None)` if declared but unset.
    pub fn attribute(&self, role: Role) -> Result<Option<&Value>, TreeError> {
        if !self.declares(role) {
            return Err(TreeError::UnknownRole {
                node: self.kind.label(),
                role,
            });
        }
        Ok(self.attrs.get(&role))
    }

    /// Lenient lookup: `None` when unset or undeclared.
    pub fn get(&self, role: Role) -> Option<&Value> {
        self.attrs.get(&role)
    }

    /// The object held in `role`, looking through states.
    pub fn object_in(&self, role: Role) -> Option<&ObjectRef> {
        self.get(role).and_then(Value::object)
    }

    /// Every object held in `role`.
    pub fn members_of(&self, role: Role) -> Vec<ObjectRef> {
        self.get(role).map(Value::members).unwrap_or_default()
    }

    pub fn attributes(&self) -> impl Iterator<Item = (Role, &Value)> {
        self.attrs.iter().map(|(r, v)| (*r, v))
    }

    /// Builder-style role assignment.
    pub fn with(mut self, role: Role, value: impl Into<Value>) -> Result<Self, TreeError> {
        if !self.declares(role) {
            return Err(TreeError::UnknownRole {
                node: self.kind.label(),
                role,
            });
        }
        self.attrs.insert(role, value.into());
        Ok(self)
    }

    /// Same kind and attributes, new children.
    pub fn with_children(&self, children: Vec<Node<K>>) -> Self {
        Self {
            kind: self.kind.clone(),
            children,
            attrs: self.attrs.clone(),
        }
    }

    /// Same kind and children, some attributes replaced.
    pub fn with_attributes(
        &self,
        overrides: impl IntoIterator<Item = (Role, Value)>,
    ) -> Result<Self, TreeError> {
        let mut node = self.clone();
        for (role, value) in overrides {
            node = node.with(role, value)?;
        }
        Ok(node)
    }

    /// Rewrites every attribute value in place of a copy; roles stay as they are.
    pub fn map_values(&self, mut f: impl FnMut(Role, &Value) -> Value) -> Self {
        Self {
            kind: self.kind.clone(),
            children: self.children.clone(),
            attrs: self.attrs.iter().map(|(r, v)| (*r, f(*r, v))).collect(),
        }
    }

    /// Collapses nested same-kind sequence wrappers, recursively.
    pub fn flatten(&self) -> Self {
        let mut children = Vec::with_capacity(self.children.len());
        for child in &self.children {
            let flat = child.flatten();
            if self.kind.is_sequence() && flat.kind == self.kind {
                children.extend(flat.children);
            } else {
                children.push(flat);
            }
        }
        self.with_children(children)
    }

    /// Preorder list of this node and all its descendants.
    pub fn descendants(&self) -> Vec<&Node<K>> {
        let mut out = vec![self];
        for child in &self.children {
            out.extend(child.descendants());
        }
        out
    }

    /// Indented debug rendering of the whole tree.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.dump_into(&mut out, 0);
        out
    }

    /// One-line description: kind plus attributes, no children.
    pub fn summary(&self) -> String {
        let mut out = format!("{:?}", self.kind);
        if !self.attrs.is_empty() {
            let attrs: Vec<String> = self
                .attrs
                .iter()
                .map(|(r, v)| format!("{}={:?}", r, v))
                .collect();
            let _ = write!(out, "({})", attrs.join(", "));
        }
        out
    }

    fn dump_into(&self, out: &mut String, depth: usize) {
        let _ = writeln!(out, "{:indent$}{}", "", self.summary(), indent = depth * 2);
        for child in &self.children {
            child.dump_into(out, depth + 1);
        }
    }
}
