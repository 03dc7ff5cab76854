use crate::geometry::Shape;

/// A region of constant refractive index.
#[derive(Debug, Clone)]
pub struct Layer {
    name: String,
    shape: Shape,
    index: f64,
    precedence: Option<i32>,
}

impl Layer {
    /// Creates a layer with no explicit precedence.
    #[must_use]
    pub fn new(name: impl Into<String>, shape: Shape, index: f64) -> Self {
        Self {
            name: name.into(),
            shape,
            index,
            precedence: None,
        }
    }

    /// Higher precedence paints later and wins where layers overlap.
    #[must_use]
    pub fn with_precedence(mut self, precedence: i32) -> Self {
        self.precedence = Some(precedence);
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    #[must_use]
    pub fn index(&self) -> f64 {
        self.index
    }

    #[must_use]
    pub fn precedence(&self) -> Option<i32> {
        self.precedence
    }

    /// Precedence used for ordering; unspecified counts as 0.
    #[must_use]
    pub fn effective_precedence(&self) -> i32 {
        self.precedence.unwrap_or(0)
    }

    pub(crate) fn with_index(&self, index: f64) -> Self {
        Self {
            index,
            ..self.clone()
        }
    }
}
