mod common;

use common::*;
use marten_pdr::{config::Config, reports::Report};

mod scenarios {
    use super::*;

    #[test]
    fn trivial_goal_in_initial() {
        let problem = problem(2, &[0, 1], &[1], vec![action("noop", &[0], &[1], &[])]);
        assert!(problem.goal_in_initial());
    }

    #[test]
    fn one_step_plan() {
        let (ctx, report) = solve(one_step(), Config::default());

        assert_eq!(report, Report::PlanFound(1));
        let plan = ctx.last_plan.as_deref().unwrap();
        assert_eq!(plan.len(), 1);
        assert!(plan_is_valid(&ctx, plan));
    }

    #[test]
    fn blocksworld_a_on_b() {
        let (ctx, report) = solve(blocksworld(), Config::default());

        assert!(matches!(report, Report::PlanFound(_)));
        let plan = ctx.last_plan.as_deref().unwrap();
        // pick-up a; stack a b is minimal, and elimination cannot shorten
        // below it.
        assert!((2..=3).contains(&plan.len()), "plan: {plan:?}");
        assert!(plan_is_valid(&ctx, plan));
    }

    #[test]
    fn unsat_by_invariant_precheck() {
        // The backward invariant of the unreachable problem keeps the goal
        // unit, which the start state falsifies outright.
        let (_ctx, report) = solve(unreachable(), Config::default());
        assert_eq!(report, Report::Unsatisfiable);
    }

    #[test]
    fn empty_layer_unsat() {
        // With the invariant precheck out of the way, stabilisation is
        // detected by pushing emptying a delta layer.
        let mut config = Config::default();
        config.gen_invariant.value = false;
        let (_ctx, report) = solve(unreachable(), config);
        assert_eq!(report, Report::Unsatisfiable);
    }

    #[test]
    fn unsat_without_pushing() {
        // With cla_subsumption == 1 stabilisation is still caught, by the
        // subsumption cascade rather than by pushing.
        let mut config = Config::default();
        config.gen_invariant.value = false;
        config.cla_subsumption.value = 1;
        let (_ctx, report) = solve(unreachable(), config);
        assert_eq!(report, Report::Unsatisfiable);
    }

    #[test]
    fn phase_cap() {
        let mut config = Config::default();
        config.phaselim.value = 0;
        let (_ctx, report) = solve(one_step(), config);
        assert_eq!(report, Report::Unresolved);
    }

    #[test]
    fn incomplete_survival_reports_unresolved() {
        let mut config = Config::default();
        config.gen_invariant.value = false;
        config.obl_survive.value = 2;
        let (_ctx, report) = solve(unreachable(), config);
        assert_eq!(report, Report::Unresolved);
    }
}

mod invariant_example {
    use super::*;
    use marten_pdr::{invariant, structures::problem::Model};

    // Facts {p, q}, one action pre {p} add {q}, goal {q}.
    #[test]
    fn two_fact_derivation() {
        let mut prob = one_step();
        prob.normalize();
        let model = Model::build(&prob, false);

        let clauses: Vec<_> = invariant::derive(&model).collect();
        assert!(clauses.len() <= 2);

        // Inductiveness: any clause an action adds into without meeting a
        // precondition must leave a shielding clause behind.
        for clause in &clauses {
            let atoms: Vec<_> = if clause.is_unit() {
                vec![clause.l1]
            } else {
                vec![clause.l1, clause.l2]
            };

            for action in &model.actions {
                let pre_meets = action.pre.iter().any(|p| atoms.contains(p));
                let add_meets = action.add.iter().any(|a| atoms.contains(a));
                if pre_meets || !add_meets {
                    continue;
                }

                let remainder: Vec<_> = atoms
                    .iter()
                    .filter(|atom| !action.add.contains(atom))
                    .chain(action.del.iter())
                    .copied()
                    .collect();

                let shielded = clauses.iter().any(|d| {
                    let d_atoms: Vec<_> = if d.is_unit() {
                        vec![d.l1]
                    } else {
                        vec![d.l1, d.l2]
                    };
                    d_atoms.iter().all(|atom| remainder.contains(atom))
                });
                assert!(shielded, "clause {clause:?} unshielded against {}", action.name);
            }
        }
    }

    #[test]
    fn invariant_rejects_impossible_start() {
        // Forward search whose goal regresses to a condition the initial
        // state misses entirely: the precheck fires before any phase.
        let prob = problem(
            2,
            &[],
            &[1],
            vec![action("make", &[0], &[1], &[])],
        );
        let (_ctx, report) = solve(prob, Config::default());
        assert_eq!(report, Report::Unsatisfiable);
    }
}
