//! Operator precedence levels.
//!
//! Lower numbers bind tighter. An operand is wrapped in parentheses only
//! when its own level is looser than the level its position requires.

/// Binding strength of a rendered expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Precedence {
    Atomic = 0,
    FunctionCall = 20,
    Exponent = 30,
    Unary = 40,
    Multiplicative = 50,
    Additive = 60,
    Comparison = 70,
    And = 80,
    Or = 90,
    None = 990,
}

impl Precedence {
    /// The next tighter level. `Atomic` is its own tighter level.
    pub fn tighter(self) -> Self {
        match self {
            Self::Atomic | Self::FunctionCall => Self::Atomic,
            Self::Exponent => Self::FunctionCall,
            Self::Unary => Self::Exponent,
            Self::Multiplicative => Self::Unary,
            Self::Additive => Self::Multiplicative,
            Self::Comparison => Self::Additive,
            Self::And => Self::Comparison,
            Self::Or => Self::And,
            Self::None => Self::Or,
        }
    }

    /// True when an expression at this level must be parenthesized in a
    /// position that requires `required`.
    pub fn needs_parens(self, required: Precedence) -> bool {
        self > required
    }
}

/// A binary operator as it appears in source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinaryOp {
    pub symbol: &'static str,
    pub precedence: Precedence,
    /// `a op b op c` groups from the left without parentheses.
    pub associative: bool,
    /// Right-associative (`^`).
    pub right: bool,
}

impl BinaryOp {
    const fn new(symbol: &'static str, precedence: Precedence, associative: bool) -> Self {
        Self {
            symbol,
            precedence,
            associative,
            right: false,
        }
    }

    /// Arithmetic operator for a `math_arithmetic` OP field.
    pub fn arithmetic(op: &str) -> Self {
        match op {
            "MINUS" => Self::new("-", Precedence::Additive, false),
            "MULTIPLY" => Self::new("*", Precedence::Multiplicative, true),
            "DIVIDE" => Self::new("/", Precedence::Multiplicative, false),
            "POWER" => Self {
                right: true,
                ..Self::new("^", Precedence::Exponent, false)
            },
            _ => Self::new("+", Precedence::Additive, true),
        }
    }

    /// Comparison operator for a `logic_compare` OP field.
    pub fn comparison(op: &str) -> Self {
        let symbol = match op {
            "NEQ" => "!=",
            "LT" => "<",
            "LTE" => "<=",
            "GT" => ">",
            "GTE" => ">=",
            _ => "==",
        };
        Self::new(symbol, Precedence::Comparison, false)
    }

    /// Logical operator for a `logic_operation` OP field.
    pub fn logical(op: &str) -> Self {
        match op {
            "OR" => Self::new("ou", Precedence::Or, true),
            _ => Self::new("et", Precedence::And, true),
        }
    }

    /// Levels required of the left and right operands.
    pub fn operand_levels(self) -> (Precedence, Precedence) {
        if self.right {
            (self.precedence.tighter(), self.precedence)
        } else if self.associative {
            (self.precedence, self.precedence)
        } else {
            (self.precedence, self.precedence.tighter())
        }
    }
}
