/*!
Reading a grounded problem.

Grounding itself is an external concern; the engine consumes its output in
a DIMACS-spirited text format, one record per line, atoms numbered from 1,
atom groups terminated by `0`:

```text
c a comment
p strips ATOMS ACTIONS
d DOMAIN-NAME PROBLEM-NAME
f ATOM NAME...
i ATOM ... 0
g ATOM ... 0
a NAME... : PRE... 0 ADD... 0 DEL... 0
```

The `p` line must precede every other record except comments. `f`, `d` are
optional (facts default to `f1`, `f2`, …); `i` and `g` list the initial
state and the goal condition; each `a` line is one grounded action, its
name running up to the `:`.

```rust
# use marten_pdr::builder::read_strips;
let text = "\
p strips 2 1
i 1 0
g 2 0
a step : 1 0 2 0 0
";
let problem = read_strips(text.as_bytes()).unwrap();
assert_eq!(problem.atom_count(), 2);
assert_eq!(problem.actions.len(), 1);
```
*/

use std::io::BufRead;

use crate::{
    misc::log::targets,
    structures::{action::Action, atom::Atom, problem::Problem, state::State},
    types::err::{self, ErrorKind},
};

/// State of a partially read problem.
struct Reader {
    atom_count: usize,
    domain_name: String,
    problem_name: String,
    atom_names: Vec<String>,
    actions: Vec<Action>,
    initial: Option<State>,
    goal: Option<Vec<Atom>>,
}

impl Reader {
    /// Parses a 1-based atom token.
    fn atom(&self, token: &str, line: usize) -> Result<Atom, ErrorKind> {
        let value: usize = token
            .parse()
            .map_err(|_| err::ParseError::Line(line))?;
        if value == 0 || value > self.atom_count {
            return Err(err::ParseError::AtomOutOfRange(line).into());
        }
        Ok((value - 1) as Atom)
    }

    /// Parses a `0`-terminated atom group from `tokens`.
    fn atom_group<'t>(
        &self,
        tokens: &mut impl Iterator<Item = &'t str>,
        line: usize,
    ) -> Result<Vec<Atom>, ErrorKind> {
        let mut atoms = Vec::new();
        for token in tokens {
            if token == "0" {
                return Ok(atoms);
            }
            atoms.push(self.atom(token, line)?);
        }
        Err(err::ParseError::MissingTerminator(line).into())
    }
}

/// Reads a grounded problem from `source`.
pub fn read_strips(source: impl BufRead) -> Result<Problem, ErrorKind> {
    let mut reader: Option<Reader> = None;

    for (index, line) in source.lines().enumerate() {
        let line = line.map_err(ErrorKind::from)?;
        let number = index + 1;

        let mut tokens = line.split_whitespace();
        let Some(tag) = tokens.next() else { continue };

        match tag {
            "c" => continue,

            "p" => {
                if reader.is_some() {
                    return Err(err::ParseError::ProblemSpecification.into());
                }
                if tokens.next() != Some("strips") {
                    return Err(err::ParseError::ProblemSpecification.into());
                }
                let atoms: usize = tokens
                    .next()
                    .and_then(|t| t.parse().ok())
                    .ok_or(err::ParseError::ProblemSpecification)?;
                let actions: usize = tokens
                    .next()
                    .and_then(|t| t.parse().ok())
                    .ok_or(err::ParseError::ProblemSpecification)?;
                if atoms == 0 {
                    return Err(err::BuildError::NoAtoms.into());
                }

                reader = Some(Reader {
                    atom_count: atoms,
                    domain_name: "domain".to_string(),
                    problem_name: "problem".to_string(),
                    atom_names: (1..=atoms).map(|i| format!("f{i}")).collect(),
                    actions: Vec::with_capacity(actions),
                    initial: None,
                    goal: None,
                });
            }

            _ => {
                let Some(reader) = reader.as_mut() else {
                    return Err(err::ParseError::MisplacedProblem(number).into());
                };

                match tag {
                    "d" => {
                        if let Some(domain) = tokens.next() {
                            reader.domain_name = domain.to_string();
                        }
                        if let Some(problem) = tokens.next() {
                            reader.problem_name = problem.to_string();
                        }
                    }

                    "f" => {
                        let atom = match tokens.next() {
                            Some(token) => reader.atom(token, number)?,
                            None => return Err(err::ParseError::Line(number).into()),
                        };
                        let name = tokens.collect::<Vec<_>>().join(" ");
                        if name.is_empty() {
                            return Err(err::ParseError::Line(number).into());
                        }
                        reader.atom_names[atom as usize] = name;
                    }

                    "i" => {
                        let atoms = reader.atom_group(&mut tokens, number)?;
                        let mut state = State::filled(reader.atom_count, false);
                        for atom in atoms {
                            state.set(atom);
                        }
                        reader.initial = Some(state);
                    }

                    "g" => {
                        let mut atoms = reader.atom_group(&mut tokens, number)?;
                        atoms.sort_unstable();
                        atoms.dedup();
                        reader.goal = Some(atoms);
                    }

                    "a" => {
                        let mut name_tokens = Vec::new();
                        for token in tokens.by_ref() {
                            if token == ":" {
                                break;
                            }
                            name_tokens.push(token);
                        }
                        if name_tokens.is_empty() {
                            return Err(err::ParseError::Line(number).into());
                        }

                        let pre = reader.atom_group(&mut tokens, number)?;
                        let add = reader.atom_group(&mut tokens, number)?;
                        let del = reader.atom_group(&mut tokens, number)?;
                        if tokens.next().is_some() {
                            return Err(err::ParseError::Line(number).into());
                        }

                        reader.actions.push(Action {
                            name: name_tokens.join(" "),
                            pre,
                            add,
                            del,
                        });
                    }

                    _ => return Err(err::ParseError::Line(number).into()),
                }
            }
        }
    }

    let Some(reader) = reader else {
        return Err(err::ParseError::ProblemSpecification.into());
    };
    let Some(initial) = reader.initial else {
        return Err(err::ParseError::Incomplete.into());
    };
    let Some(goal) = reader.goal else {
        return Err(err::ParseError::Incomplete.into());
    };
    if goal.is_empty() {
        return Err(err::BuildError::EmptyGoal.into());
    }

    log::info!(target: targets::BUILD,
        "Read problem with {} atoms and {} actions",
        reader.atom_count, reader.actions.len());

    Ok(Problem {
        domain_name: reader.domain_name,
        problem_name: reader.problem_name,
        atom_names: reader.atom_names,
        actions: reader.actions,
        initial,
        goal,
    })
}
