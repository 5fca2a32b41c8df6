use std::collections::HashMap;

use crate::value::{ParamKind, ParamValue, ScalarRange};

/// Callback run when a parameter changes. Receives the new value and the
/// render-state target it is responsible for updating.
pub type ChangeCallback<T> = Box<dyn FnMut(&ParamValue, &mut T)>;

/// Errors from panel operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParamError {
    #[error("parameter {0:?} is already registered")]
    DuplicateName(String),
    #[error("no parameter named {0:?}")]
    UnknownParameter(String),
    #[error("parameter {name:?} is a {expected}, got a {found}")]
    KindMismatch {
        name: String,
        expected: ParamKind,
        found: ParamKind,
    },
    #[error("group {0:?} already exists")]
    DuplicateGroup(String),
    #[error("unknown group {0:?}")]
    UnknownGroup(GroupId),
    #[error("parameter {name:?} cannot use range {min}..{max}")]
    InvalidRange { name: String, min: f32, max: f32 },
}

/// Handle to a display group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupId(usize);

/// A named, independently collapsible group of parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub name: String,
    pub collapsed: bool,
}

/// A registered parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    name: String,
    value: ParamValue,
    range: Option<ScalarRange>,
    group: Option<GroupId>,
}

impl Parameter {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &ParamValue {
        &self.value
    }

    pub fn kind(&self) -> ParamKind {
        self.value.kind()
    }

    pub fn range(&self) -> Option<ScalarRange> {
        self.range
    }

    pub fn group(&self) -> Option<GroupId> {
        self.group
    }
}

/// Live-editable parameter set.
///
/// `T` is the render-state type that change callbacks write into (the scene
/// in the demos, a mock in tests). The panel never holds a reference to it;
/// the caller lends it to [`set`](Self::set) and [`sync`](Self::sync).
pub struct ParameterPanel<T> {
    params: Vec<Parameter>,
    callbacks: Vec<Option<ChangeCallback<T>>>,
    index: HashMap<String, usize>,
    groups: Vec<Group>,
}

impl<T> ParameterPanel<T> {
    pub fn new() -> Self {
        Self {
            params: Vec::new(),
            callbacks: Vec::new(),
            index: HashMap::new(),
            groups: Vec::new(),
        }
    }

    /// Register a new ungrouped parameter.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        initial: ParamValue,
        kind: ParamKind,
    ) -> Result<(), ParamError> {
        self.insert(name.into(), initial, kind, None)
    }

    /// Register a parameter inside a display group.
    pub fn register_in(
        &mut self,
        group: GroupId,
        name: impl Into<String>,
        initial: ParamValue,
        kind: ParamKind,
    ) -> Result<(), ParamError> {
        if group.0 >= self.groups.len() {
            return Err(ParamError::UnknownGroup(group));
        }
        self.insert(name.into(), initial, kind, Some(group))
    }

    fn insert(
        &mut self,
        name: String,
        initial: ParamValue,
        kind: ParamKind,
        group: Option<GroupId>,
    ) -> Result<(), ParamError> {
        if self.index.contains_key(&name) {
            return Err(ParamError::DuplicateName(name));
        }
        if initial.kind() != kind {
            return Err(ParamError::KindMismatch {
                name,
                expected: kind,
                found: initial.kind(),
            });
        }
        tracing::debug!(%name, %kind, "registered parameter");
        self.index.insert(name.clone(), self.params.len());
        self.params.push(Parameter {
            name,
            value: initial,
            range: None,
            group,
        });
        self.callbacks.push(None);
        Ok(())
    }

    /// Restrict a scalar parameter to a range. The current value is clamped
    /// in place; no callback runs. Bounds must be finite and ordered.
    pub fn set_range(&mut self, name: &str, range: ScalarRange) -> Result<(), ParamError> {
        let i = self.lookup(name)?;
        if !range.is_valid() {
            return Err(ParamError::InvalidRange {
                name: name.to_string(),
                min: range.min,
                max: range.max,
            });
        }
        let param = &mut self.params[i];
        let ParamValue::Scalar(v) = param.value else {
            return Err(ParamError::KindMismatch {
                name: name.to_string(),
                expected: ParamKind::Scalar,
                found: param.kind(),
            });
        };
        param.value = ParamValue::Scalar(range.clamp(v));
        param.range = Some(range);
        Ok(())
    }

    /// Subscribe the change callback for `name`, replacing any earlier one.
    pub fn on_change<F>(&mut self, name: &str, callback: F) -> Result<(), ParamError>
    where
        F: FnMut(&ParamValue, &mut T) + 'static,
    {
        let i = self.lookup(name)?;
        if self.callbacks[i].is_some() {
            tracing::debug!(name, "replacing change callback");
        }
        self.callbacks[i] = Some(Box::new(callback));
        Ok(())
    }

    /// Apply a change coming from the GUI. Scalars are clamped into their
    /// range. The callback has run by the time this returns. Returns the
    /// value actually stored.
    pub fn set(
        &mut self,
        name: &str,
        value: ParamValue,
        target: &mut T,
    ) -> Result<ParamValue, ParamError> {
        let i = self.lookup(name)?;
        let param = &mut self.params[i];
        if value.kind() != param.kind() {
            return Err(ParamError::KindMismatch {
                name: name.to_string(),
                expected: param.kind(),
                found: value.kind(),
            });
        }
        let stored = match (value, param.range) {
            (ParamValue::Scalar(v), Some(range)) => ParamValue::Scalar(range.clamp(v)),
            _ => value,
        };
        param.value = stored;
        tracing::debug!(name, ?stored, "parameter changed");
        if let Some(callback) = self.callbacks[i].as_mut() {
            callback(&stored, target);
        }
        Ok(stored)
    }

    /// Push every current value through its callback. Used right after a
    /// panel is built so consumers start from the panel's values.
    pub fn sync(&mut self, target: &mut T) {
        for (param, callback) in self.params.iter().zip(self.callbacks.iter_mut()) {
            if let Some(callback) = callback {
                callback(&param.value, target);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.index.get(name).map(|&i| &self.params[i].value)
    }

    /// All parameters in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.params.iter()
    }

    /// Parameters of one group (`None` = ungrouped), in registration order.
    pub fn in_group(&self, group: Option<GroupId>) -> impl Iterator<Item = &Parameter> {
        self.params.iter().filter(move |p| p.group == group)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    // --- Groups ---
    pub fn add_group(&mut self, name: impl Into<String>) -> Result<GroupId, ParamError> {
        let name = name.into();
        if self.groups.iter().any(|g| g.name == name) {
            return Err(ParamError::DuplicateGroup(name));
        }
        self.groups.push(Group {
            name,
            collapsed: false,
        });
        Ok(GroupId(self.groups.len() - 1))
    }

    pub fn group(&self, id: GroupId) -> Option<&Group> {
        self.groups.get(id.0)
    }

    pub fn groups(&self) -> impl Iterator<Item = (GroupId, &Group)> {
        self.groups.iter().enumerate().map(|(i, g)| (GroupId(i), g))
    }

    pub fn set_collapsed(&mut self, id: GroupId, collapsed: bool) -> Result<(), ParamError> {
        let group = self
            .groups
            .get_mut(id.0)
            .ok_or(ParamError::UnknownGroup(id))?;
        group.collapsed = collapsed;
        Ok(())
    }

    fn lookup(&self, name: &str) -> Result<usize, ParamError> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| ParamError::UnknownParameter(name.to_string()))
    }
}

impl<T> Default for ParameterPanel<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for ParameterPanel<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParameterPanel")
            .field("params", &self.params)
            .field("groups", &self.groups)
            .finish_non_exhaustive()
    }
}
