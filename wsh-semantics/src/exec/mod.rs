//! The executor: walks a parsed [`Script`] and runs it against an [`Env`]
//! (`spec.md` §4.6 "Executor").
//!
//! This is a synchronous recursive-call interpreter, not an async state
//! machine: there is no real process model to suspend into (`spec.md` §5),
//! so every exec function just returns once the command it represents has
//! fully run. [`wsh_env::special::Signal`] carries non-local control flow
//! (`break`/`continue`/`return`/`exit`) up through the call tree instead of
//! a dedicated error type, the same way `wsh-builtin`'s special commands
//! report it — see that type's doc comment for why it lives in `wsh-env`
//! rather than here.
//!
//! Every exec function threads its command's stdout/stderr explicitly as a
//! [`CommandResult`] and returns it, rather than writing into `env.streams`
//! from deep in the recursion: a pipeline stage needs its predecessor's
//! stdout as its own stdin, and a subshell/command substitution needs its
//! whole subtree's output captured separately from the parent's.
//! [`run_top_level`] is the only place that appends to `env.streams`.

pub mod redir;
mod xtrace;

use crate::arith_env::eval_arith;
use crate::assign::assign_value;
use crate::cond::eval_cond;
use crate::expansion::{expand_word_single, expand_words, expand_words_single};
use std::rc::Rc;
use wsh_env::function::Function;
use wsh_env::limits::{Counters, LimitError};
use wsh_env::option::{self, ShellOption};
use wsh_env::registry::CommandInput;
use wsh_env::special::Signal;
use wsh_env::streams::CapturedStreams;
use wsh_env::variable::{Context, PositionalParams, Value};
use wsh_env::Env;
use wsh_syntax::syntax::{
    Assignment, AssignmentValue, CStyleForCommand, CaseCommand, CaseTerminator, Command,
    CompoundCommand, ForCommand, IfCommand, Pipeline, Script, SelectCommand, SimpleCommand,
    Statement,
};

/// A command's captured output, threaded explicitly through the call tree
/// instead of written straight into `env.streams`.
#[derive(Clone, Debug, Default)]
pub struct CommandResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_status: u8,
}

impl CommandResult {
    fn from_status(exit_status: u8) -> Self {
        CommandResult {
            exit_status,
            ..Default::default()
        }
    }

    fn append(&mut self, other: &CommandResult) {
        self.stdout.push_str(&other.stdout);
        self.stderr.push_str(&other.stderr);
        self.exit_status = other.exit_status;
    }
}

/// Runs `script` as the top-level program: its combined output is appended
/// to `env.streams` once, and its exit status becomes `env.exit_status`.
/// Compound-command bodies and subshell scripts instead call
/// [`run_script`] directly and carry the result up through their own
/// [`CommandResult`], never touching `env.streams`.
pub fn run_top_level(script: &Script, env: &mut Env) -> Signal {
    let (result, signal) = run_script(script, env);
    env.streams.write_stdout(&result.stdout);
    env.streams.write_stderr(&result.stderr);
    env.exit_status = result.exit_status;
    signal
}

/// Runs every [`Statement`] in `script` in turn, accumulating their output
/// and stopping at the first non-`None` [`Signal`]. `errexit` (`spec.md`
/// §4.6 "errexit") is checked once per statement here — this function is
/// the single shared statement-loop reused for every nested script list
/// (loop bodies, `if` branches, `case` arms, function bodies, subshells),
/// so the check naturally applies at every nesting level; a condition
/// script run via [`run_condition`] temporarily disables it instead, per
/// the POSIX/bash exemption for loop and `if` conditions. [`exec_and_or`]
/// reports the symmetrical exemption for a pipeline element other than the
/// one following the final `&&`/`||`, and for a command negated with `!`,
/// via its `errexit_exempt` return value.
pub fn run_script(script: &Script, env: &mut Env) -> (CommandResult, Signal) {
    let mut combined = CommandResult::default();
    for statement in &script.statements {
        let (result, signal, errexit_exempt) = exec_and_or(&statement.and_or, env);
        combined.append(&result);
        env.exit_status = result.exit_status;
        if signal != Signal::None {
            return (combined, signal);
        }
        if env.options.is_on(ShellOption::ErrExit) && result.exit_status != 0 && !errexit_exempt {
            return (combined, Signal::Exit(result.exit_status));
        }
    }
    (combined, Signal::None)
}

/// Runs `script` against an isolated snapshot [`Env`] and returns only its
/// captured stdout, discarding everything else (per-subshell variable,
/// function, alias, and trap state never escapes) — the shared mechanism
/// behind command substitution and process substitution. The real
/// filesystem handle is shared, so filesystem side effects inside the
/// substitution are visible afterward, matching bash. An `exit` inside the
/// substitution ends only the substitution, not the calling script.
pub fn run_captured(script: &Script, env: &mut Env) -> String {
    let mut snapshot = snapshot_env(env);
    let (result, _signal) = run_script(script, &mut snapshot);
    env.exit_status = result.exit_status;
    result.stdout
}

/// Builds an isolated `Env` for a subshell/substitution: every field of
/// `Env` is individually `Clone`, so this is a plain struct literal rather
/// than a method on `Env` itself, with the filesystem handle shared (an
/// `Rc` clone) and the captured-output buffer reset to empty.
fn snapshot_env(env: &Env) -> Env {
    Env {
        variables: env.variables.clone(),
        functions: env.functions.clone(),
        aliases: env.aliases.clone(),
        options: env.options,
        traps: env.traps.clone(),
        limits: env.limits,
        counters: env.counters,
        streams: CapturedStreams::new(),
        fs: Rc::clone(&env.fs),
        registry: env.registry.clone(),
        specials: env.specials.clone(),
        exit_status: env.exit_status,
        cwd: env.cwd.clone(),
        shell_name: env.shell_name.clone(),
    }
}

/// Runs a loop/`if` condition script with `errexit` temporarily disabled,
/// restoring the previous setting afterward (see [`run_script`]'s doc
/// comment).
fn run_condition(script: &Script, env: &mut Env) -> (CommandResult, Signal) {
    let was_on = env.options.is_on(ShellOption::ErrExit);
    env.options.set(ShellOption::ErrExit, option::Off);
    let outcome = run_script(script, env);
    if was_on {
        env.options.set(ShellOption::ErrExit, option::On);
    }
    outcome
}

/// Runs an `&&`/`||` chain, also reporting whether its final exit status is
/// exempt from `errexit` (`spec.md` §4.6 "errexit", the named "left side of
/// `&&`/`||` except the last" and `!`-negation exemptions): exempt when the
/// pipeline that actually produced the final status isn't the one
/// syntactically following the chain's last `&&`/`||` (because a later
/// conjunct was short-circuited away), or when that pipeline is itself
/// negated with `!` — bash never lets `-e` fire on a negated command's
/// status regardless of position.
fn exec_and_or(and_or: &wsh_syntax::syntax::AndOrList, env: &mut Env) -> (CommandResult, Signal, bool) {
    let mut combined = CommandResult::default();
    let (first, signal) = exec_pipeline(&and_or.first, env);
    combined.append(&first);
    if signal != Signal::None {
        return (combined, signal, false);
    }
    let mut last_negated = and_or.first.negated;
    let mut last_was_final_conjunct = and_or.rest.is_empty();
    for (index, (op, pipeline)) in and_or.rest.iter().enumerate() {
        let should_run = match op {
            wsh_syntax::syntax::AndOrOp::And => combined.exit_status == 0,
            wsh_syntax::syntax::AndOrOp::Or => combined.exit_status != 0,
        };
        if !should_run {
            continue;
        }
        let (result, signal) = exec_pipeline(pipeline, env);
        combined.append(&result);
        last_negated = pipeline.negated;
        last_was_final_conjunct = index == and_or.rest.len() - 1;
        if signal != Signal::None {
            return (combined, signal, false);
        }
    }
    let errexit_exempt = !last_was_final_conjunct || last_negated;
    (combined, Signal::None, errexit_exempt)
}

/// Chains pipeline stages sequentially: each non-last stage (or every
/// stage unless `lastpipe` is on and it's the last one) runs against an
/// isolated snapshot `Env`, feeding its stdout — plus stderr too if that
/// stage used `|&` — forward as the next stage's stdin. There are no real
/// OS pipes or concurrency (`spec.md` §5), so stages run one at a time in
/// order rather than simultaneously.
fn exec_pipeline(pipeline: &Pipeline, env: &mut Env) -> (CommandResult, Signal) {
    if pipeline.commands.is_empty() {
        return (CommandResult::from_status(0), Signal::None);
    }

    let last_pipe = env.options.is_on(ShellOption::LastPipe);
    let last_index = pipeline.commands.len() - 1;
    let mut stdin = Vec::new();
    let mut combined = CommandResult::default();
    let mut rightmost_nonzero = 0u8;

    for (index, command) in pipeline.commands.iter().enumerate() {
        let is_last = index == last_index;
        let (result, signal) = if is_last && last_pipe {
            exec_command(command, env, stdin.clone())
        } else {
            let mut stage_env = snapshot_env(env);
            exec_command(command, &mut stage_env, stdin.clone())
        };

        if !is_last {
            let pipe_stderr = pipeline.pipe_stderr.get(index).copied().unwrap_or(false);
            let mut forwarded = result.stdout.clone();
            if pipe_stderr {
                forwarded.push_str(&result.stderr);
            }
            stdin = forwarded.into_bytes();
            combined.stderr.push_str(&result.stderr);
        } else {
            combined.append(&result);
        }
        if result.exit_status != 0 {
            rightmost_nonzero = result.exit_status;
        }

        if signal != Signal::None {
            return (combined, signal);
        }
    }

    if env.options.is_on(ShellOption::PipeFail) && rightmost_nonzero != 0 {
        combined.exit_status = rightmost_nonzero;
    }

    if pipeline.negated {
        combined.exit_status = if combined.exit_status == 0 { 1 } else { 0 };
    }

    (combined, Signal::None)
}

fn exec_command(command: &Command, env: &mut Env, stdin: Vec<u8>) -> (CommandResult, Signal) {
    match command {
        Command::Simple(simple) => exec_simple_command(simple, env, stdin),
        Command::Compound(compound, redirections) => {
            // A compound command's own `< file` redirection only ever
            // reaches a `read`-style builtin through real file descriptors
            // in bash; this interpreter has no descriptor table to thread
            // it through (`spec.md` §5), so `stdin_override` here is
            // computed (for validation) but not propagated to the body.
            let plan = match redir::plan_redirections(redirections, env) {
                Ok(plan) => plan,
                Err(e) => return error_result(&e.to_string()),
            };
            let (mut result, signal) = exec_compound(compound, env);
            match redir::apply_output_plan(&plan, std::mem::take(&mut result.stdout), std::mem::take(&mut result.stderr), env) {
                Ok((stdout, stderr)) => {
                    result.stdout = stdout;
                    result.stderr = stderr;
                }
                Err(e) => return error_result(&e.to_string()),
            }
            (result, signal)
        }
        Command::FunctionDef(def) => {
            let body = Rc::from(def.body.clone());
            let function = Function::new(def.name.clone(), body, def.location.clone());
            env.functions.define(function).ok();
            (CommandResult::from_status(0), Signal::None)
        }
    }
}

fn error_result(message: &str) -> (CommandResult, Signal) {
    (
        CommandResult {
            stdout: String::new(),
            stderr: format!("wsh: {message}\n"),
            exit_status: 1,
        },
        Signal::None,
    )
}

fn exec_simple_command(simple: &SimpleCommand, env: &mut Env, stdin: Vec<u8>) -> (CommandResult, Signal) {
    if let Err(e) = env.counters.count_command(&env.limits) {
        return limit_result(e);
    }

    let words = match expand_words(&simple.words, env) {
        Ok(w) => w,
        Err(e) => return error_result(&e.to_string()),
    };

    let trace = if words.is_empty() { String::new() } else { xtrace::trace_line(&words, env) };

    if words.is_empty() {
        // `X=1 Y=2` with no command words applies to the enclosing scope
        // (no `Volatile` context is pushed), per POSIX.
        if let Err(e) = apply_assignments(&simple.assignments, env) {
            return error_result(&e.to_string());
        }
        return (CommandResult::from_status(0), Signal::None);
    }

    env.variables.push_context(Context::Volatile);
    if let Err(e) = apply_assignments(&simple.assignments, env) {
        env.variables.pop_context();
        return error_result(&e.to_string());
    }

    let plan = match redir::plan_redirections(&simple.redirections, env) {
        Ok(plan) => plan,
        Err(e) => {
            env.variables.pop_context();
            return error_result(&e.to_string());
        }
    };
    let effective_stdin = plan.stdin_override.clone().unwrap_or(stdin);

    let (mut result, signal) = dispatch_command(&words, effective_stdin, env);
    env.variables.pop_context();

    result.stderr = format!("{trace}{}", result.stderr);

    match redir::apply_output_plan(&plan, std::mem::take(&mut result.stdout), std::mem::take(&mut result.stderr), env) {
        Ok((stdout, stderr)) => {
            result.stdout = stdout;
            result.stderr = stderr;
        }
        Err(e) => return error_result(&e.to_string()),
    }

    (result, signal)
}

fn apply_assignments(assignments: &[Assignment], env: &mut Env) -> crate::error::Result<()> {
    for assignment in assignments {
        apply_one_assignment(assignment, env)?;
    }
    Ok(())
}

fn apply_one_assignment(assignment: &Assignment, env: &mut Env) -> crate::error::Result<()> {
    let value = match &assignment.value {
        AssignmentValue::Scalar(word) => Value::Scalar(expand_word_single(word, env)?),
        AssignmentValue::Array(elements) => {
            let mut values = Vec::with_capacity(elements.len());
            for element in elements {
                let _ = &element.key;
                values.push(expand_word_single(&element.value, env)?);
            }
            Value::Array(values)
        }
    };
    if assignment.append {
        match value {
            Value::Scalar(s) => {
                crate::assign::append_scalar(&mut env.variables, &assignment.name, &s).ok();
            }
            Value::Array(a) => {
                crate::assign::append_array(&mut env.variables, &assignment.name, a).ok();
            }
        }
    } else {
        assign_value(&mut env.variables, &assignment.name, value).ok();
    }
    Ok(())
}

fn limit_result(error: LimitError) -> (CommandResult, Signal) {
    (
        CommandResult {
            stdout: String::new(),
            stderr: format!("wsh: {error}\n"),
            exit_status: 1,
        },
        Signal::Exit(1),
    )
}

/// Looks up `words[0]` as a function, then a special command, then a
/// registered command, in that order (`spec.md` §4.7 "Command dispatch");
/// exit status 127 with "command not found" if none match.
fn dispatch_command(words: &[String], stdin: Vec<u8>, env: &mut Env) -> (CommandResult, Signal) {
    let name = &words[0];

    if let Some(function) = env.functions.get(name) {
        let body = function.body.clone();
        return call_function(&body, words, env);
    }

    if let Some(special) = env.specials.look_up(name) {
        // `words` is passed straight through as the builtin's own argv;
        // positional parameters (`$@`) are left untouched so builtins like
        // `shift`/`set` that inspect or replace them see the script's real
        // parameters, not their own arguments.
        let (outcome, signal) = special.run(env, words);
        return (
            CommandResult {
                stdout: outcome.stdout,
                stderr: outcome.stderr,
                exit_status: outcome.exit_status,
            },
            signal,
        );
    }

    if let Some(registered) = env.registry.look_up(name) {
        let input = CommandInput {
            argv: words.to_vec(),
            stdin,
            cwd: env.cwd.clone(),
            env: env.exported_env(),
            fs: &*env.fs,
        };
        let output = registered.run(input);
        return (
            CommandResult {
                stdout: output.stdout,
                stderr: output.stderr,
                exit_status: output.exit_status,
            },
            Signal::None,
        );
    }

    (
        CommandResult {
            stdout: String::new(),
            stderr: format!("wsh: {name}: command not found\n"),
            exit_status: 127,
        },
        Signal::None,
    )
}

fn call_function(body: &CompoundCommand, words: &[String], env: &mut Env) -> (CommandResult, Signal) {
    if let Err(e) = env.counters.enter_call(&env.limits) {
        return limit_result(e);
    }

    env.variables.push_context(Context::Regular {
        positional_params: PositionalParams {
            values: words[1..].to_vec(),
        },
    });

    let (mut result, signal) = exec_compound(body, env);

    env.variables.pop_context();
    env.counters.exit_call();

    match signal {
        Signal::Return(status) => {
            result.exit_status = status;
            (result, Signal::None)
        }
        other => (result, other),
    }
}

fn exec_compound(compound: &CompoundCommand, env: &mut Env) -> (CommandResult, Signal) {
    match compound {
        CompoundCommand::If(if_command) => exec_if(if_command, env),
        CompoundCommand::For(for_command) => exec_for(for_command, env),
        CompoundCommand::CStyleFor(c_for) => exec_c_style_for(c_for, env),
        CompoundCommand::While(loop_) => exec_while_until(loop_, env, true),
        CompoundCommand::Until(loop_) => exec_while_until(loop_, env, false),
        CompoundCommand::Case(case) => exec_case(case, env),
        CompoundCommand::Select(select) => exec_select(select, env),
        CompoundCommand::Subshell(script) => exec_subshell(script, env),
        CompoundCommand::Group(script) => run_script(script, env),
        CompoundCommand::ArithmeticCmd(expr) => {
            let location = wsh_syntax::source::Location::dummy();
            match eval_arith(expr, env, &location) {
                Ok(value) => (CommandResult::from_status(if value == 0 { 1 } else { 0 }), Signal::None),
                Err(e) => error_result(&e.to_string()),
            }
        }
        CompoundCommand::ConditionalCmd(cond) => match eval_cond(cond, env) {
            Ok(true) => (CommandResult::from_status(0), Signal::None),
            Ok(false) => (CommandResult::from_status(1), Signal::None),
            Err(e) => error_result(&e.to_string()),
        },
    }
}

fn exec_if(if_command: &IfCommand, env: &mut Env) -> (CommandResult, Signal) {
    let mut combined = CommandResult::default();
    for (condition, body) in &if_command.branches {
        let (cond_result, signal) = run_condition(condition, env);
        combined.append(&cond_result);
        if signal != Signal::None {
            return (combined, signal);
        }
        if combined.exit_status == 0 {
            let (result, signal) = run_script(body, env);
            combined.append(&result);
            return (combined, signal);
        }
    }
    if let Some(else_) = &if_command.else_ {
        let (result, signal) = run_script(else_, env);
        combined.append(&result);
        return (combined, signal);
    }
    combined.exit_status = 0;
    (combined, Signal::None)
}

fn exec_for(for_command: &ForCommand, env: &mut Env) -> (CommandResult, Signal) {
    let items = match &for_command.words {
        Some(words) => match expand_words(words, env) {
            Ok(items) => items,
            Err(e) => return error_result(&e.to_string()),
        },
        None => env.variables.positional_params().to_vec(),
    };

    let mut loop_iterations = 0u64;
    let mut combined = CommandResult::default();
    for item in items {
        if let Err(e) = Counters::count_loop_iteration(&mut loop_iterations, &env.limits) {
            return limit_result(e);
        }
        assign_value(&mut env.variables, &for_command.name, Value::Scalar(item)).ok();
        let (result, signal) = run_script(&for_command.body, env);
        combined.append(&result);
        match signal {
            Signal::Break(n) if n > 1 => return (combined, Signal::Break(n - 1)),
            Signal::Break(_) => break,
            Signal::Continue(n) if n > 1 => return (combined, Signal::Continue(n - 1)),
            Signal::Continue(_) => continue,
            Signal::None => {}
            other => return (combined, other),
        }
    }
    (combined, Signal::None)
}

fn exec_c_style_for(c_for: &CStyleForCommand, env: &mut Env) -> (CommandResult, Signal) {
    let location = wsh_syntax::source::Location::dummy();
    if let Some(init) = &c_for.init {
        if let Err(e) = eval_arith(init, env, &location) {
            return error_result(&e.to_string());
        }
    }

    let mut loop_iterations = 0u64;
    let mut combined = CommandResult::default();
    loop {
        if let Some(cond) = &c_for.cond {
            match eval_arith(cond, env, &location) {
                Ok(0) => break,
                Ok(_) => {}
                Err(e) => return error_result(&e.to_string()),
            }
        }

        if let Err(e) = Counters::count_loop_iteration(&mut loop_iterations, &env.limits) {
            return limit_result(e);
        }

        let (result, signal) = run_script(&c_for.body, env);
        combined.append(&result);
        match signal {
            Signal::Break(n) if n > 1 => return (combined, Signal::Break(n - 1)),
            Signal::Break(_) => break,
            Signal::Continue(n) if n > 1 => return (combined, Signal::Continue(n - 1)),
            Signal::Continue(_) => {}
            Signal::None => {}
            other => return (combined, other),
        }

        if let Some(update) = &c_for.update {
            if let Err(e) = eval_arith(update, env, &location) {
                return error_result(&e.to_string());
            }
        }
    }
    (combined, Signal::None)
}

fn exec_while_until(loop_: &wsh_syntax::syntax::ConditionalLoop, env: &mut Env, is_while: bool) -> (CommandResult, Signal) {
    let mut loop_iterations = 0u64;
    let mut combined = CommandResult::default();
    loop {
        let (cond_result, signal) = run_condition(&loop_.condition, env);
        combined.append(&cond_result);
        if signal != Signal::None {
            return (combined, signal);
        }
        let condition_met = (combined.exit_status == 0) == is_while;
        if !condition_met {
            break;
        }

        if let Err(e) = Counters::count_loop_iteration(&mut loop_iterations, &env.limits) {
            return limit_result(e);
        }

        let (result, signal) = run_script(&loop_.body, env);
        combined.append(&result);
        match signal {
            Signal::Break(n) if n > 1 => return (combined, Signal::Break(n - 1)),
            Signal::Break(_) => break,
            Signal::Continue(n) if n > 1 => return (combined, Signal::Continue(n - 1)),
            Signal::Continue(_) => continue,
            Signal::None => {}
            other => return (combined, other),
        }
    }
    (combined, Signal::None)
}

fn exec_case(case: &CaseCommand, env: &mut Env) -> (CommandResult, Signal) {
    let subject = match expand_word_single(&case.subject, env) {
        Ok(s) => s,
        Err(e) => return error_result(&e.to_string()),
    };

    let mut combined = CommandResult::default();
    let mut index = 0;
    // Set by `;&` (`FallThrough`) to run the next arm's body unconditionally,
    // without re-testing its pattern; cleared again once that arm's body has
    // run, so a chain of several `;&` (or a `;&` followed by `;;&`) walks
    // arm by arm through the loop instead of being handled inline.
    let mut force_run = false;
    while index < case.arms.len() {
        if !force_run {
            let patterns = match expand_words_single(&case.arms[index].patterns, env) {
                Ok(p) => p,
                Err(e) => return error_result(&e.to_string()),
            };
            let matched = patterns.iter().any(|pattern| case_pattern_matches(pattern, &subject, env));
            if !matched {
                index += 1;
                continue;
            }
        }
        force_run = false;

        let (result, signal) = run_script(&case.arms[index].body, env);
        combined.append(&result);
        if signal != Signal::None {
            return (combined, signal);
        }
        match case.arms[index].terminator {
            CaseTerminator::Break(_) => return (combined, Signal::None),
            CaseTerminator::FallThrough(_) => {
                index += 1;
                if index >= case.arms.len() {
                    return (combined, Signal::None);
                }
                force_run = true;
            }
            CaseTerminator::TestNext(_) => {
                index += 1;
            }
        }
    }
    (combined, Signal::None)
}

fn case_pattern_matches(pattern_text: &str, candidate: &str, env: &Env) -> bool {
    let config = wsh_fnmatch::parse::Config {
        extended_glob: env.options.is_on(ShellOption::ExtGlob),
    };
    let case_insensitive = env.options.is_on(ShellOption::NoCaseMatch);
    match wsh_fnmatch::Pattern::parse_chars(pattern_text.chars().map(wsh_fnmatch::PatternChar::Normal), config, case_insensitive) {
        Ok(pattern) => pattern.is_match(candidate),
        Err(_) => pattern_text == candidate,
    }
}

/// `select` reads no real terminal in this hermetic interpreter
/// (`spec.md` §5); it runs its body once against the first item (or an
/// empty `$REPLY` if the list is empty) rather than looping on interactive
/// input, since there is no read-eval loop to drive it.
fn exec_select(select: &SelectCommand, env: &mut Env) -> (CommandResult, Signal) {
    let items = match &select.words {
        Some(words) => match expand_words(words, env) {
            Ok(items) => items,
            Err(e) => return error_result(&e.to_string()),
        },
        None => env.variables.positional_params().to_vec(),
    };

    let reply = items.first().cloned().unwrap_or_default();
    assign_value(&mut env.variables, &select.name, Value::Scalar(reply.clone())).ok();
    assign_value(&mut env.variables, "REPLY", Value::Scalar(reply)).ok();

    let (result, signal) = run_script(&select.body, env);
    match signal {
        Signal::Break(n) if n > 1 => (result, Signal::Break(n - 1)),
        Signal::Break(_) => (result, Signal::None),
        Signal::Continue(n) if n > 1 => (result, Signal::Continue(n - 1)),
        Signal::Continue(_) => (result, Signal::None),
        other => (result, other),
    }
}

/// Runs `script` against an isolated snapshot `Env`, so variable/function
/// changes made inside `(...)` don't escape (per bash's subshell
/// semantics); `exit` inside the subshell ends only the subshell.
fn exec_subshell(script: &Script, env: &mut Env) -> (CommandResult, Signal) {
    if let Err(e) = env.counters.enter_call(&env.limits) {
        return limit_result(e);
    }
    let mut snapshot = snapshot_env(env);
    let (result, signal) = run_script(script, &mut snapshot);
    env.counters.exit_call();
    env.exit_status = result.exit_status;
    let signal = match signal {
        Signal::Exit(_) => Signal::None,
        other => other,
    };
    (result, signal)
}
