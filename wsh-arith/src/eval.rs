// Licensed under the MIT license. See LICENSE for details.

//! Evaluates a parsed [`Expr`] over 64-bit signed integers (`spec.md` §4.4).

use crate::ast::{AssignOp, BinaryOp, Expr, Lvalue, PostfixOp, UnaryOp};
use crate::env::Env;
use crate::token::parse_integer;

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum EvalError<E> {
    #[error("division by zero")]
    DivisionByZero,
    #[error("variable value is not a valid integer")]
    InvalidVariableValue,
    #[error("negative shift amount")]
    NegativeShift,
    #[error("negative exponent")]
    NegativeExponent,
    #[error("{0}")]
    Env(E),
}

pub type Result<T, E> = std::result::Result<T, EvalError<E>>;

fn str_to_int<E>(s: &str) -> Result<i64, E> {
    parse_integer(s.trim()).ok_or(EvalError::InvalidVariableValue)
}

/// Reads the current value of an lvalue. Takes `env` mutably because an
/// array index expression (`a[i++]`) may itself assign.
fn read<E: Env>(lv: &Lvalue, env: &mut E) -> Result<i64, E::Error> {
    let text = match lv {
        Lvalue::Variable(name) => env.get_variable(name).map_err(EvalError::Env)?,
        Lvalue::Element(name, index) => {
            let idx = eval(index, env)?;
            env.get_element(name, idx).map_err(EvalError::Env)?
        }
    };
    match text {
        None => Ok(0),
        Some(s) => str_to_int(&s),
    }
}

fn write<E: Env>(lv: &Lvalue, value: i64, env: &mut E) -> Result<(), E::Error> {
    match lv {
        Lvalue::Variable(name) => env.assign_variable(name, value).map_err(EvalError::Env),
        Lvalue::Element(name, index) => {
            let idx = eval(index, env)?;
            env.assign_element(name, idx, value).map_err(EvalError::Env)
        }
    }
}

/// Evaluates `expr`, applying any assignments to `env` along the way.
pub fn eval<E: Env>(expr: &Expr, env: &mut E) -> Result<i64, E::Error> {
    match expr {
        Expr::Number(n) => Ok(*n),
        Expr::Var(lv) => read(lv, env),
        Expr::Unary(op, inner) => {
            match op {
                UnaryOp::Plus => eval(inner, env),
                UnaryOp::Minus => Ok(eval(inner, env)?.wrapping_neg()),
                UnaryOp::LogicalNot => Ok((eval(inner, env)? == 0) as i64),
                UnaryOp::BitwiseNot => Ok(!eval(inner, env)?),
                UnaryOp::PreIncrement | UnaryOp::PreDecrement => {
                    let Expr::Var(lv) = inner.as_ref() else {
                        unreachable!("parser only builds Pre{{In,De}}crement over Var")
                    };
                    let old = read(lv, env)?;
                    let new = if matches!(op, UnaryOp::PreIncrement) {
                        old.wrapping_add(1)
                    } else {
                        old.wrapping_sub(1)
                    };
                    write(lv, new, env)?;
                    Ok(new)
                }
            }
        }
        Expr::Postfix(op, lv) => {
            let old = read(lv, env)?;
            let new = match op {
                PostfixOp::Increment => old.wrapping_add(1),
                PostfixOp::Decrement => old.wrapping_sub(1),
            };
            write(lv, new, env)?;
            Ok(old)
        }
        Expr::Binary(op, lhs, rhs) => eval_binary(*op, lhs, rhs, env),
        Expr::Assign(op, lv, rhs) => {
            let rhs_val = eval(rhs, env)?;
            let new = match op {
                AssignOp::Assign => rhs_val,
                _ => {
                    let lhs_val = read(lv, env)?;
                    apply_compound(*op, lhs_val, rhs_val)?
                }
            };
            write(lv, new, env)?;
            Ok(new)
        }
        Expr::Ternary(cond, then, else_) => {
            if eval(cond, env)? != 0 {
                eval(then, env)
            } else {
                eval(else_, env)
            }
        }
        Expr::Comma(lhs, rhs) => {
            eval(lhs, env)?;
            eval(rhs, env)
        }
    }
}

fn apply_compound<E>(op: AssignOp, lhs: i64, rhs: i64) -> Result<i64, E> {
    match op {
        AssignOp::Assign => unreachable!(),
        AssignOp::Add => Ok(lhs.wrapping_add(rhs)),
        AssignOp::Sub => Ok(lhs.wrapping_sub(rhs)),
        AssignOp::Mul => Ok(lhs.wrapping_mul(rhs)),
        AssignOp::Div => {
            if rhs == 0 {
                Err(EvalError::DivisionByZero)
            } else {
                Ok(lhs.wrapping_div(rhs))
            }
        }
        AssignOp::Rem => {
            if rhs == 0 {
                Err(EvalError::DivisionByZero)
            } else {
                Ok(lhs.wrapping_rem(rhs))
            }
        }
        AssignOp::Shl => shift_left(lhs, rhs),
        AssignOp::Shr => shift_right(lhs, rhs),
        AssignOp::BitAnd => Ok(lhs & rhs),
        AssignOp::BitXor => Ok(lhs ^ rhs),
        AssignOp::BitOr => Ok(lhs | rhs),
    }
}

fn shift_left<E>(lhs: i64, rhs: i64) -> Result<i64, E> {
    if rhs < 0 {
        return Err(EvalError::NegativeShift);
    }
    Ok(lhs.wrapping_shl(rhs as u32 & 63))
}

fn shift_right<E>(lhs: i64, rhs: i64) -> Result<i64, E> {
    if rhs < 0 {
        return Err(EvalError::NegativeShift);
    }
    Ok(lhs.wrapping_shr(rhs as u32 & 63))
}

fn eval_binary<E: Env>(op: BinaryOp, lhs: &Expr, rhs: &Expr, env: &mut E) -> Result<i64, E::Error> {
    // `&&` and `||` short-circuit: the right operand must not be evaluated
    // (and must not perform its assignments) unless needed.
    match op {
        BinaryOp::Or => {
            let l = eval(lhs, env)?;
            if l != 0 {
                return Ok(1);
            }
            return Ok((eval(rhs, env)? != 0) as i64);
        }
        BinaryOp::And => {
            let l = eval(lhs, env)?;
            if l == 0 {
                return Ok(0);
            }
            return Ok((eval(rhs, env)? != 0) as i64);
        }
        _ => {}
    }

    let l = eval(lhs, env)?;
    let r = eval(rhs, env)?;
    match op {
        BinaryOp::Or | BinaryOp::And => unreachable!(),
        BinaryOp::BitOr => Ok(l | r),
        BinaryOp::BitXor => Ok(l ^ r),
        BinaryOp::BitAnd => Ok(l & r),
        BinaryOp::Eq => Ok((l == r) as i64),
        BinaryOp::Ne => Ok((l != r) as i64),
        BinaryOp::Lt => Ok((l < r) as i64),
        BinaryOp::Le => Ok((l <= r) as i64),
        BinaryOp::Gt => Ok((l > r) as i64),
        BinaryOp::Ge => Ok((l >= r) as i64),
        BinaryOp::Shl => shift_left(l, r),
        BinaryOp::Shr => shift_right(l, r),
        BinaryOp::Add => Ok(l.wrapping_add(r)),
        BinaryOp::Sub => Ok(l.wrapping_sub(r)),
        BinaryOp::Mul => Ok(l.wrapping_mul(r)),
        BinaryOp::Div => {
            if r == 0 {
                Err(EvalError::DivisionByZero)
            } else {
                Ok(l.wrapping_div(r))
            }
        }
        BinaryOp::Rem => {
            if r == 0 {
                Err(EvalError::DivisionByZero)
            } else {
                Ok(l.wrapping_rem(r))
            }
        }
        BinaryOp::Pow => {
            if r < 0 {
                return Err(EvalError::NegativeExponent);
            }
            let mut acc: i64 = 1;
            for _ in 0..r {
                acc = acc.wrapping_mul(l);
            }
            Ok(acc)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::parse;
    use std::collections::HashMap;

    #[derive(Default)]
    struct TestEnv {
        scalars: HashMap<String, String>,
        arrays: HashMap<String, HashMap<i64, String>>,
    }

    impl Env for TestEnv {
        type Error = std::convert::Infallible;

        fn get_variable(&self, name: &str) -> std::result::Result<Option<String>, Self::Error> {
            Ok(self.scalars.get(name).cloned())
        }

        fn get_element(&self, name: &str, index: i64) -> std::result::Result<Option<String>, Self::Error> {
            Ok(self.arrays.get(name).and_then(|a| a.get(&index)).cloned())
        }

        fn assign_variable(&mut self, name: &str, value: i64) -> std::result::Result<(), Self::Error> {
            self.scalars.insert(name.to_string(), value.to_string());
            Ok(())
        }

        fn assign_element(&mut self, name: &str, index: i64, value: i64) -> std::result::Result<(), Self::Error> {
            self.arrays.entry(name.to_string()).or_default().insert(index, value.to_string());
            Ok(())
        }
    }

    fn run(src: &str, env: &mut TestEnv) -> i64 {
        eval(&parse(src).unwrap(), env).unwrap()
    }

    #[test]
    fn evaluates_precedence_and_parens() {
        let mut env = TestEnv::default();
        assert_eq!(run("1 + 2 * 3", &mut env), 7);
        assert_eq!(run("(1 + 2) * 3", &mut env), 9);
    }

    #[test]
    fn assignment_updates_the_environment_and_yields_the_new_value() {
        let mut env = TestEnv::default();
        assert_eq!(run("x = 5", &mut env), 5);
        assert_eq!(env.scalars.get("x").unwrap(), "5");
        assert_eq!(run("x += 3", &mut env), 8);
    }

    #[test]
    fn ternary_short_circuits_the_untaken_branch() {
        let mut env = TestEnv::default();
        assert_eq!(run("1 ? 2 : (1 / 0)", &mut env), 2);
        assert_eq!(run("0 ? (1 / 0) : 3", &mut env), 3);
    }

    #[test]
    fn logical_operators_short_circuit() {
        let mut env = TestEnv::default();
        assert_eq!(run("1 || (1 / 0)", &mut env), 1);
        assert_eq!(run("0 && (1 / 0)", &mut env), 0);
    }

    #[test]
    fn pre_and_post_increment_differ_in_their_value() {
        let mut env = TestEnv::default();
        env.assign_variable("x", 1).unwrap();
        assert_eq!(run("x++", &mut env), 1);
        assert_eq!(env.scalars.get("x").unwrap(), "2");
        assert_eq!(run("++x", &mut env), 3);
    }

    #[test]
    fn array_elements_are_readable_and_assignable() {
        let mut env = TestEnv::default();
        env.assign_element("a", 0, 10).unwrap();
        env.assign_element("a", 2, 20).unwrap();
        assert_eq!(run("a[0] + a[2]", &mut env), 30);
        run("a[1] = a[0] + a[2]", &mut env);
        assert_eq!(env.arrays["a"][&1], "30");
    }

    #[test]
    fn unset_variable_evaluates_to_zero() {
        let mut env = TestEnv::default();
        assert_eq!(run("unset_var + 1", &mut env), 1);
    }

    #[test]
    fn division_and_modulus_truncate_toward_zero() {
        let mut env = TestEnv::default();
        assert_eq!(run("7 / 2", &mut env), 3);
        assert_eq!(run("-7 / 2", &mut env), -3);
        assert_eq!(run("7 % 3", &mut env), 1);
        assert_eq!(run("-7 % 3", &mut env), -1);
    }

    #[test]
    fn division_by_zero_is_an_error() {
        let mut env = TestEnv::default();
        let err = eval(&parse("1 / 0").unwrap(), &mut env).unwrap_err();
        assert_eq!(err, EvalError::DivisionByZero);
    }

    #[test]
    fn arithmetic_wraps_on_overflow_instead_of_erroring() {
        let mut env = TestEnv::default();
        assert_eq!(run("9223372036854775807 + 1", &mut env), i64::MIN);
        assert_eq!(run("-9223372036854775807 - 2", &mut env), i64::MAX);
        assert_eq!(run("9223372036854775807 * 2", &mut env), -2);
    }

    #[test]
    fn negative_shift_amount_is_an_error() {
        let mut env = TestEnv::default();
        let err = eval(&parse("1 << -1").unwrap(), &mut env).unwrap_err();
        assert_eq!(err, EvalError::NegativeShift);
    }

    #[test]
    fn power_right_associates_before_evaluation() {
        let mut env = TestEnv::default();
        assert_eq!(run("2 ** 3 ** 2", &mut env), 512);
    }
}
