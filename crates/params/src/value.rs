use shaderbox_common::Color;

/// The kind of a parameter, fixed at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKind {
    Scalar,
    Color,
    Bool,
}

impl std::fmt::Display for ParamKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Scalar => "scalar",
            Self::Color => "color",
            Self::Bool => "bool",
        };
        f.write_str(s)
    }
}

/// A parameter value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamValue {
    Scalar(f32),
    Color(Color),
    Bool(bool),
}

impl ParamValue {
    pub fn kind(&self) -> ParamKind {
        match self {
            Self::Scalar(_) => ParamKind::Scalar,
            Self::Color(_) => ParamKind::Color,
            Self::Bool(_) => ParamKind::Bool,
        }
    }

    pub fn as_scalar(&self) -> Option<f32> {
        match self {
            Self::Scalar(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<Color> {
        match self {
            Self::Color(c) => Some(*c),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<f32> for ParamValue {
    fn from(v: f32) -> Self {
        Self::Scalar(v)
    }
}

impl From<Color> for ParamValue {
    fn from(c: Color) -> Self {
        Self::Color(c)
    }
}

impl From<bool> for ParamValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// Allowed range for a scalar parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalarRange {
    pub min: f32,
    pub max: f32,
    /// Widget step; `None` lets the GUI choose.
    pub step: Option<f32>,
}

impl ScalarRange {
    pub fn new(min: f32, max: f32) -> Self {
        Self {
            min: min.min(max),
            max: max.max(min),
            step: None,
        }
    }

    pub fn with_step(mut self, step: f32) -> Self {
        self.step = Some(step);
        self
    }

    /// Finite bounds with `min <= max`, and a positive finite step if any.
    pub fn is_valid(&self) -> bool {
        self.min.is_finite()
            && self.max.is_finite()
            && self.min <= self.max
            && self.step.is_none_or(|s| s.is_finite() && s > 0.0)
    }

    /// Clamps `v` into the range. An invalid range leaves `v` unchanged.
    pub fn clamp(&self, v: f32) -> f32 {
        if self.is_valid() {
            v.clamp(self.min, self.max)
        } else {
            v
        }
    }
}
