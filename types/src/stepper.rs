//! Typed counter arithmetic for counter-bounded loops.
//!
//! A counter loop is described by `(initial, relation, bound, assignment, step)`.
//! [`Relation`] and [`Assignment`] are closed operator sets; [`Operand`] is the
//! constraint every primitive numeric kind satisfies. Unsupported operand types
//! are rejected at compile time, unsupported operator/operand combinations by
//! [`CounterRange::validate`].

use std::any::type_name;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Comparison applied between the current counter value and the bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    Equal,
    NotEqual,
    LessThan,
    LessOrEqual,
    GreaterThan,
    GreaterOrEqual,
}

impl Relation {
    pub const ALL: [Relation; 6] = [
        Relation::Equal,
        Relation::NotEqual,
        Relation::LessThan,
        Relation::LessOrEqual,
        Relation::GreaterThan,
        Relation::GreaterOrEqual,
    ];

    /// Whether `lhs <relation> rhs` holds, i.e. whether the loop continues.
    #[must_use]
    pub fn holds<T: Operand>(self, lhs: T, rhs: T) -> bool {
        match self {
            Self::Equal => lhs == rhs,
            Self::NotEqual => lhs != rhs,
            Self::LessThan => lhs < rhs,
            Self::LessOrEqual => lhs <= rhs,
            Self::GreaterThan => lhs > rhs,
            Self::GreaterOrEqual => lhs >= rhs,
        }
    }

    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::LessThan => "<",
            Self::LessOrEqual => "<=",
            Self::GreaterThan => ">",
            Self::GreaterOrEqual => ">=",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Relation {
    type Err = StepperError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|relation| relation.symbol() == trimmed)
            .ok_or_else(|| StepperError::UnknownOperator {
                operator: trimmed.to_string(),
            })
    }
}

/// Compound assignment that produces the next counter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Assignment {
    Add,
    Subtract,
    Multiply,
    Divide,
    Remainder,
    ShiftLeft,
    ShiftRight,
}

impl Assignment {
    pub const ALL: [Assignment; 7] = [
        Assignment::Add,
        Assignment::Subtract,
        Assignment::Multiply,
        Assignment::Divide,
        Assignment::Remainder,
        Assignment::ShiftLeft,
        Assignment::ShiftRight,
    ];

    /// Next counter value, or `None` when it is not representable.
    #[must_use]
    pub fn apply<T: Operand>(self, current: T, step: T) -> Option<T> {
        current.checked_step(self, step)
    }

    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+=",
            Self::Subtract => "-=",
            Self::Multiply => "*=",
            Self::Divide => "/=",
            Self::Remainder => "%=",
            Self::ShiftLeft => "<<=",
            Self::ShiftRight => ">>=",
        }
    }

    #[must_use]
    pub const fn is_shift(self) -> bool {
        matches!(self, Self::ShiftLeft | Self::ShiftRight)
    }

    /// Whether the operator is defined for operands of the given kind.
    #[must_use]
    pub const fn supports(self, kind: OperandKind) -> bool {
        match kind {
            OperandKind::Integer => true,
            OperandKind::Float => !self.is_shift(),
        }
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Assignment {
    type Err = StepperError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|assignment| assignment.symbol() == trimmed)
            .ok_or_else(|| StepperError::UnknownOperator {
                operator: trimmed.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandKind {
    Integer,
    Float,
}

/// A primitive numeric type usable as a loop counter.
pub trait Operand: Copy + PartialOrd + fmt::Debug + fmt::Display + Send + Sync + 'static {
    const KIND: OperandKind;
    const ZERO: Self;
    const ONE: Self;

    /// Checked compound assignment. `None` on overflow, a non-finite float
    /// result, or an operator the kind does not define.
    fn checked_step(self, assignment: Assignment, step: Self) -> Option<Self>;

    /// False for values that cannot take part in an ordered comparison (NaN).
    fn is_well_formed(self) -> bool;
}

macro_rules! integer_operand {
    ($($ty:ty),* $(,)?) => {$(
        impl Operand for $ty {
            const KIND: OperandKind = OperandKind::Integer;
            const ZERO: Self = 0;
            const ONE: Self = 1;

            fn checked_step(self, assignment: Assignment, step: Self) -> Option<Self> {
                match assignment {
                    Assignment::Add => self.checked_add(step),
                    Assignment::Subtract => self.checked_sub(step),
                    Assignment::Multiply => self.checked_mul(step),
                    Assignment::Divide => self.checked_div(step),
                    Assignment::Remainder => self.checked_rem(step),
                    Assignment::ShiftLeft => u32::try_from(step)
                        .ok()
                        .and_then(|amount| self.checked_shl(amount)),
                    Assignment::ShiftRight => u32::try_from(step)
                        .ok()
                        .and_then(|amount| self.checked_shr(amount)),
                }
            }

            fn is_well_formed(self) -> bool {
                true
            }
        }
    )*};
}

macro_rules! float_operand {
    ($($ty:ty),* $(,)?) => {$(
        impl Operand for $ty {
            const KIND: OperandKind = OperandKind::Float;
            const ZERO: Self = 0.0;
            const ONE: Self = 1.0;

            fn checked_step(self, assignment: Assignment, step: Self) -> Option<Self> {
                let next = match assignment {
                    Assignment::Add => self + step,
                    Assignment::Subtract => self - step,
                    Assignment::Multiply => self * step,
                    Assignment::Divide => self / step,
                    Assignment::Remainder => self % step,
                    Assignment::ShiftLeft | Assignment::ShiftRight => return None,
                };
                next.is_finite().then_some(next)
            }

            fn is_well_formed(self) -> bool {
                !self.is_nan()
            }
        }
    )*};
}

integer_operand!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
float_operand!(f32, f64);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StepperError {
    #[error("operator '{assignment}' is not supported for operand type {operand}")]
    UnsupportedAssignment {
        assignment: Assignment,
        operand: &'static str,
    },
    #[error("{field} is NaN")]
    NotANumber { field: &'static str },
    #[error("step for '{assignment}' must not be zero")]
    ZeroDivisor { assignment: Assignment },
    #[error("shift amount {step} is out of range for operand type {operand}")]
    ShiftOutOfRange { step: String, operand: &'static str },
    #[error("unknown operator '{operator}'")]
    UnknownOperator { operator: String },
}

/// `(initial, relation, bound[, assignment, step])` describing a counter loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CounterRange<T> {
    pub initial: T,
    pub relation: Relation,
    pub bound: T,
    pub assignment: Assignment,
    pub step: T,
}

impl<T: Operand> CounterRange<T> {
    /// Range advancing by `+= 1`.
    #[must_use]
    pub fn new(initial: T, relation: Relation, bound: T) -> Self {
        Self {
            initial,
            relation,
            bound,
            assignment: Assignment::Add,
            step: T::ONE,
        }
    }

    #[must_use]
    pub fn step(mut self, assignment: Assignment, step: T) -> Self {
        self.assignment = assignment;
        self.step = step;
        self
    }

    /// Half-open ascending range `start..end`.
    #[must_use]
    pub fn up_to(start: T, end: T) -> Self {
        Self::new(start, Relation::LessThan, end)
    }

    pub fn validate(&self) -> Result<(), StepperError> {
        let operand = type_name::<T>();

        if !self.assignment.supports(T::KIND) {
            return Err(StepperError::UnsupportedAssignment {
                assignment: self.assignment,
                operand,
            });
        }

        for (field, value) in [
            ("initial", self.initial),
            ("bound", self.bound),
            ("step", self.step),
        ] {
            if !value.is_well_formed() {
                return Err(StepperError::NotANumber { field });
            }
        }

        match self.assignment {
            Assignment::Divide | Assignment::Remainder if self.step == T::ZERO => {
                Err(StepperError::ZeroDivisor {
                    assignment: self.assignment,
                })
            }
            // Probe the shift amount against a known-good value.
            Assignment::ShiftLeft | Assignment::ShiftRight
                if T::ONE.checked_step(self.assignment, self.step).is_none() =>
            {
                Err(StepperError::ShiftOutOfRange {
                    step: self.step.to_string(),
                    operand,
                })
            }
            _ => Ok(()),
        }
    }

    /// Validate and turn the range into a serial iterator of counter values.
    pub fn into_counter(self) -> Result<Counter<T>, StepperError> {
        self.validate()?;
        Ok(Counter {
            next: Some(self.initial),
            range: self,
            overflowed: false,
        })
    }
}

/// Serial walk over a validated [`CounterRange`].
///
/// Ends when the relation stops holding, or after the last representable value
/// when the assignment overflows.
#[derive(Debug, Clone)]
pub struct Counter<T> {
    range: CounterRange<T>,
    next: Option<T>,
    overflowed: bool,
}

impl<T: Operand> Counter<T> {
    #[must_use]
    pub fn range(&self) -> &CounterRange<T> {
        &self.range
    }

    /// True once the walk ended because the next value was not representable.
    #[must_use]
    pub fn overflowed(&self) -> bool {
        self.overflowed
    }
}

impl<T: Operand> Iterator for Counter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let current = self.next.take()?;
        if !self.range.relation.holds(current, self.range.bound) {
            return None;
        }
        self.next = self.range.assignment.apply(current, self.range.step);
        self.overflowed = self.next.is_none();
        Some(current)
    }
}
