/// `ln(e^a + e^b)`, treating `-inf` as zero probability.
#[inline]
pub fn log_add_exp(a: f32, b: f32) -> f32 {
    if a == f32::NEG_INFINITY {
        return b;
    }
    if b == f32::NEG_INFINITY {
        return a;
    }
    let max = a.max(b);
    max + (-(a - b).abs()).exp().ln_1p()
}

/// A single beam hypothesis: a collapsed label string and its path masses.
///
/// `p_blank`/`p_non_blank` accumulate during the timestep in progress,
/// the `_prev` masses hold the committed previous timestep. All values are
/// natural-log probabilities.
#[derive(Debug, Clone, PartialEq)]
pub struct Prefix {
    pub value: String,
    pub last_symbol: Option<String>,
    pub p_blank: f32,
    pub p_non_blank: f32,
    pub p_blank_prev: f32,
    pub p_non_blank_prev: f32,
    pub score: f32,
    /// Scorer weight fixed at creation, re-applied on every `step`.
    pub ext_weight: f32,
}

impl Default for Prefix {
    fn default() -> Self {
        Self::root()
    }
}

impl Prefix {
    /// The empty hypothesis every search starts from.
    pub fn root() -> Self {
        Self {
            value: String::new(),
            last_symbol: None,
            p_blank: f32::NEG_INFINITY,
            p_non_blank: f32::NEG_INFINITY,
            p_blank_prev: 0.0,
            p_non_blank_prev: f32::NEG_INFINITY,
            score: 0.0,
            ext_weight: 0.0,
        }
    }

    /// A hypothesis extending `self` by `symbol`, inheriting the carried-over masses.
    pub fn child(&self, symbol: &str) -> Self {
        let mut value = String::with_capacity(self.value.len() + symbol.len());
        value.push_str(&self.value);
        value.push_str(symbol);

        Self {
            value,
            last_symbol: Some(symbol.to_string()),
            p_blank: f32::NEG_INFINITY,
            p_non_blank: f32::NEG_INFINITY,
            p_blank_prev: self.p_blank_prev,
            p_non_blank_prev: self.p_non_blank_prev,
            score: self.score,
            ext_weight: 0.0,
        }
    }

    pub fn step(&mut self) {
        self.p_blank_prev = self.p_blank;
        self.p_non_blank_prev = self.ext_weight + self.p_non_blank;
        self.score = log_add_exp(self.p_blank_prev, self.p_non_blank_prev);

        self.p_blank = f32::NEG_INFINITY;
        self.p_non_blank = f32::NEG_INFINITY;
    }

    #[inline]
    pub fn add_p_blank(&mut self, p: f32) {
        self.p_blank = log_add_exp(self.p_blank, p);
    }

    #[inline]
    pub fn add_p_non_blank(&mut self, p: f32) {
        self.p_non_blank = log_add_exp(self.p_non_blank, p);
    }

    pub fn is_repeat(&self, symbol: &str) -> bool {
        self.last_symbol.as_deref() == Some(symbol)
    }

    pub fn snapshot(&self) -> PrefixSnapshot {
        PrefixSnapshot {
            value: self.value.clone(),
            last_symbol: self.last_symbol.clone(),
            score: self.score,
            p_blank_prev: self.p_blank_prev,
            p_non_blank_prev: self.p_non_blank_prev,
        }
    }
}

/// The committed part of a [`Prefix`], which stays fixed while a timestep is processed.
#[derive(Debug, Clone, PartialEq)]
pub struct PrefixSnapshot {
    pub value: String,
    pub last_symbol: Option<String>,
    pub score: f32,
    pub p_blank_prev: f32,
    pub p_non_blank_prev: f32,
}

impl PrefixSnapshot {
    pub fn is_repeat(&self, symbol: &str) -> bool {
        self.last_symbol.as_deref() == Some(symbol)
    }
}
