//! Parameter store: the user-editable pipeline knobs and their fixed ranges.
//!
//! Out-of-range values are not representable. Every setter saturates into the
//! parameter's `[min, max]` range, so anything holding a [`Parameters`] can rely on
//! the bounds without re-checking.

use serde::{Deserialize, Serialize};

/// Inclusive range and step for a numeric parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamRange {
    pub min: u32,
    pub max: u32,
    pub step: u32,
    pub default: u32,
}

impl ParamRange {
    /// Saturate `value` into `[min, max]`.
    pub fn clamp(&self, value: u32) -> u32 {
        value.clamp(self.min, self.max)
    }

    pub fn contains(&self, value: u32) -> bool {
        (self.min..=self.max).contains(&value)
    }

    /// Fraction of the range covered by `value`, for slider gauges.
    pub fn ratio(&self, value: u32) -> f64 {
        let span = (self.max - self.min) as f64;
        if span == 0.0 {
            return 0.0;
        }
        (self.clamp(value) - self.min) as f64 / span
    }
}

pub const CHUNK_SIZE_RANGE: ParamRange = ParamRange {
    min: 50,
    max: 800,
    step: 10,
    default: 120,
};

pub const CHUNK_OVERLAP_RANGE: ParamRange = ParamRange {
    min: 0,
    max: 300,
    step: 10,
    default: 30,
};

pub const TOP_K_RANGE: ParamRange = ParamRange {
    min: 1,
    max: 12,
    step: 1,
    default: 5,
};

/// The three numeric knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Param {
    ChunkSize,
    ChunkOverlap,
    TopK,
}

impl Param {
    pub const ALL: [Param; 3] = [Param::ChunkSize, Param::ChunkOverlap, Param::TopK];

    pub fn range(&self) -> ParamRange {
        match self {
            Self::ChunkSize => CHUNK_SIZE_RANGE,
            Self::ChunkOverlap => CHUNK_OVERLAP_RANGE,
            Self::TopK => TOP_K_RANGE,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::ChunkSize => "Chunk Size",
            Self::ChunkOverlap => "Chunk Overlap",
            Self::TopK => "Top-K",
        }
    }
}

impl std::fmt::Display for Param {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Direction for stepping a slider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepDirection {
    Up,
    Down,
}

/// Current values of every knob. Fields are private so the bounds always hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameters {
    query: String,
    chunk_size: u32,
    chunk_overlap: u32,
    top_k: u32,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            query: String::new(),
            chunk_size: CHUNK_SIZE_RANGE.default,
            chunk_overlap: CHUNK_OVERLAP_RANGE.default,
            top_k: TOP_K_RANGE.default,
        }
    }
}

impl Parameters {
    /// Build parameters from arbitrary values; numeric values are clamped.
    pub fn new(query: impl Into<String>, chunk_size: u32, chunk_overlap: u32, top_k: u32) -> Self {
        Self {
            query: query.into(),
            chunk_size: CHUNK_SIZE_RANGE.clamp(chunk_size),
            chunk_overlap: CHUNK_OVERLAP_RANGE.clamp(chunk_overlap),
            top_k: TOP_K_RANGE.clamp(top_k),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn chunk_size(&self) -> u32 {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> u32 {
        self.chunk_overlap
    }

    pub fn top_k(&self) -> u32 {
        self.top_k
    }

    pub fn get(&self, param: Param) -> u32 {
        match param {
            Param::ChunkSize => self.chunk_size,
            Param::ChunkOverlap => self.chunk_overlap,
            Param::TopK => self.top_k,
        }
    }

    /// Whether the query would pass the request builder.
    pub fn is_submittable(&self) -> bool {
        !self.query.trim().is_empty()
    }
}

/// Owner of the live [`Parameters`].
///
/// `revision` increases on every change that actually alters a value, which lets the
/// view detect edits without diffing. Setting a value to what it already is leaves the
/// revision untouched.
#[derive(Debug, Clone, Default)]
pub struct ParameterStore {
    params: Parameters,
    revision: u64,
}

impl ParameterStore {
    pub fn new(params: Parameters) -> Self {
        Self {
            params,
            revision: 0,
        }
    }

    pub fn snapshot(&self) -> Parameters {
        self.params.clone()
    }

    pub fn params(&self) -> &Parameters {
        &self.params
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn query(&self) -> &str {
        self.params.query()
    }

    /// Store the query as typed. Blank is a valid stored value.
    pub fn set_query(&mut self, query: impl Into<String>) {
        let query = query.into();
        if self.params.query != query {
            self.params.query = query;
            self.revision += 1;
        }
    }

    pub fn chunk_size(&self) -> u32 {
        self.params.chunk_size
    }

    pub fn set_chunk_size(&mut self, value: u32) -> u32 {
        self.set(Param::ChunkSize, value)
    }

    pub fn chunk_overlap(&self) -> u32 {
        self.params.chunk_overlap
    }

    pub fn set_chunk_overlap(&mut self, value: u32) -> u32 {
        self.set(Param::ChunkOverlap, value)
    }

    pub fn top_k(&self) -> u32 {
        self.params.top_k
    }

    pub fn set_top_k(&mut self, value: u32) -> u32 {
        self.set(Param::TopK, value)
    }

    /// Set a numeric knob, clamping into its range. Returns the stored value.
    pub fn set(&mut self, param: Param, value: u32) -> u32 {
        let clamped = param.range().clamp(value);
        let slot = match param {
            Param::ChunkSize => &mut self.params.chunk_size,
            Param::ChunkOverlap => &mut self.params.chunk_overlap,
            Param::TopK => &mut self.params.top_k,
        };
        if *slot != clamped {
            *slot = clamped;
            self.revision += 1;
        }
        clamped
    }

    /// Move a knob by one step, saturating at the range ends.
    pub fn step(&mut self, param: Param, direction: StepDirection) -> u32 {
        let range = param.range();
        let current = self.params.get(param);
        let next = match direction {
            StepDirection::Up => current.saturating_add(range.step),
            StepDirection::Down => current.saturating_sub(range.step),
        };
        self.set(param, next)
    }
}
