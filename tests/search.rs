mod common;

use common::*;
use marten_pdr::{config::Config, reports::Report};

mod plans {
    use super::*;

    #[test]
    fn plan_executes_to_the_goal() {
        for problem in [one_step(), blocksworld()] {
            let (ctx, report) = solve(problem, Config::default());
            assert!(matches!(report, Report::PlanFound(_)));
            assert!(plan_is_valid(&ctx, ctx.last_plan.as_deref().unwrap()));
        }
    }

    #[test]
    fn postprocess_is_idempotent() {
        let (mut ctx, report) = solve(blocksworld(), Config::default());
        assert!(matches!(report, Report::PlanFound(_)));

        let once = ctx.last_plan.clone().unwrap();
        let twice = ctx.eliminate_actions(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn postprocess_drops_detours() {
        let (mut ctx, report) = solve(blocksworld(), Config::default());
        assert!(matches!(report, Report::PlanFound(_)));
        let plan = ctx.last_plan.clone().unwrap();

        // Pad the plan with a pointless pick-up b / put-down b detour; the
        // pass must strip it again.
        let pick_b = ctx
            .model
            .actions
            .iter()
            .position(|a| a.name == "pick-up b")
            .unwrap();
        let put_b = ctx
            .model
            .actions
            .iter()
            .position(|a| a.name == "put-down b")
            .unwrap();

        let mut padded = vec![pick_b, put_b];
        padded.extend_from_slice(&plan);
        assert!(plan_is_valid(&ctx, &padded));

        let reduced = ctx.eliminate_actions(padded);
        assert_eq!(reduced, plan);
    }
}

mod reverse_mode {
    use super::*;

    #[test]
    fn one_step_duality() {
        let (forward_ctx, forward) = solve(one_step(), Config::default());

        let mut config = Config::default();
        config.reverse.value = true;
        let (reverse_ctx, reverse) = solve(one_step(), config);

        assert_eq!(forward, Report::PlanFound(1));
        assert_eq!(reverse, Report::PlanFound(1));
        assert!(plan_is_valid(&forward_ctx, forward_ctx.last_plan.as_deref().unwrap()));
        assert!(plan_is_valid(&reverse_ctx, reverse_ctx.last_plan.as_deref().unwrap()));
    }

    #[test]
    fn blocksworld_in_reverse() {
        let mut config = Config::default();
        config.reverse.value = true;
        let (ctx, report) = solve(blocksworld(), config);

        assert!(matches!(report, Report::PlanFound(_)));
        // The regression plan is validated in its own orientation.
        assert!(plan_is_valid(&ctx, ctx.last_plan.as_deref().unwrap()));
    }
}

mod configurations {
    use super::*;

    /// Every supported switch combination must still find a valid plan.
    #[test]
    fn blocksworld_across_the_switchboard() {
        let mut variants: Vec<Config> = Vec::new();

        for minimize in 0..=3 {
            let mut config = Config::default();
            config.minimize.value = minimize;
            variants.push(config);
        }
        for resched in 0..=2 {
            let mut config = Config::default();
            config.resched.value = resched;
            variants.push(config);
        }
        for quick_reason in 0..=2 {
            let mut config = Config::default();
            config.quick_reason.value = quick_reason;
            variants.push(config);
        }
        for cla_subsumption in 0..=2 {
            let mut config = Config::default();
            config.cla_subsumption.value = cla_subsumption;
            variants.push(config);
        }
        for obl_subsumption in 1..=2 {
            let mut config = Config::default();
            config.obl_subsumption.value = obl_subsumption;
            variants.push(config);
        }
        {
            // Obligation subsumption off requires survival off.
            let mut config = Config::default();
            config.obl_subsumption.value = 0;
            config.obl_survive.value = 0;
            variants.push(config);
        }
        {
            let mut config = Config::default();
            config.obl_survive.value = 0;
            variants.push(config);
        }
        {
            // FIFO obligations require sidestepping off.
            let mut config = Config::default();
            config.oblig_prior_stack.value = false;
            config.resched.value = 1;
            variants.push(config);
        }
        {
            let mut config = Config::default();
            config.gen_invariant.value = false;
            variants.push(config);
        }
        {
            let mut config = Config::default();
            config.random_seed.value = 414;
            variants.push(config);
        }

        for config in variants {
            assert!(config.check().is_ok());
            let seed = config.random_seed.value;
            let label = format!(
                "min {} resched {} qr {} cla {} obl {} survive {} stack {} inv {} seed {}",
                config.minimize.value,
                config.resched.value,
                config.quick_reason.value,
                config.cla_subsumption.value,
                config.obl_subsumption.value,
                config.obl_survive.value,
                config.oblig_prior_stack.value,
                config.gen_invariant.value,
                seed,
            );

            let (ctx, report) = solve(blocksworld(), config);
            assert!(matches!(report, Report::PlanFound(_)), "{label}");
            assert!(
                plan_is_valid(&ctx, ctx.last_plan.as_deref().unwrap()),
                "{label}"
            );
        }
    }

    #[test]
    fn identical_seeds_identical_plans() {
        let (a_ctx, a_report) = solve(blocksworld(), Config::default());
        let (b_ctx, b_report) = solve(blocksworld(), Config::default());

        assert_eq!(a_report, b_report);
        assert_eq!(a_ctx.last_plan, b_ctx.last_plan);
    }
}
