use marten_pdr::config::Config;

use crate::CliConfig;

/// Parse CLI arguments into a [Config] and a [CliConfig].
///
/// If an unrecognised argument or invalid option is found a message is sent
/// and the process is terminated.
pub fn parse_args(args: &[String], cfg: &mut Config, cli: &mut CliConfig) {
    'arg_examination: for arg in args.iter().skip(1).rev().skip(1) {
        let mut split = arg.split("=");
        match split.next() {
            Some("--path") => {
                if let Some(request) = split.next() {
                    cli.path = request.to_string();
                    continue 'arg_examination;
                }

                println!("path requires a value");
                std::process::exit(1);
            }

            Some("--just_translate") => {
                if let Some(request) = split.next() {
                    if let Ok(value) = request.parse::<u8>() {
                        if value <= 2 {
                            cli.just_translate = value;
                            continue 'arg_examination;
                        }
                    }
                }

                println!("just_translate requires a value between 0 and 2");
                std::process::exit(1);
            }

            Some("--just_dumpgrounded") => {
                if let Some(request) = split.next() {
                    if let Ok(value) = request.parse::<usize>() {
                        cli.just_dumpgrounded = Some(value);
                        continue 'arg_examination;
                    }
                }

                println!("just_dumpgrounded requires a numeric suffix");
                std::process::exit(1);
            }

            // The remaining cases follow a common template.
            // If a value is present, may be parsed appropriately, and is
            // valid, the config is updated. Otherwise, a message is sent.
            //
            // Further, the cases are in lexicographic order.
            //
            Some("--cla_subsumption") => {
                let (min, max) = cfg.cla_subsumption.min_max();

                if let Some(request) = split.next() {
                    if let Ok(value) = request.parse::<u8>() {
                        if min <= value && value <= max {
                            println!("c cla_subsumption set to: {value}");
                            cfg.cla_subsumption.value = value;
                            continue 'arg_examination;
                        }
                    }
                }

                println!("cla_subsumption requires a value between {min} and {max}");
                std::process::exit(1);
            }

            Some("--dump_dummy") => {
                let (min, max) = cfg.dump_dummy.min_max();

                if let Some(request) = split.next() {
                    if let Ok(value) = request.parse::<bool>() {
                        if min <= value && value <= max {
                            println!("c dump_dummy set to: {value}");
                            cfg.dump_dummy.value = value;
                            continue 'arg_examination;
                        }
                    }
                }

                println!("dump_dummy requires a value between {min} and {max}");
                std::process::exit(1);
            }

            Some("--gen_invariant") => {
                let (min, max) = cfg.gen_invariant.min_max();

                if let Some(request) = split.next() {
                    if let Ok(value) = request.parse::<bool>() {
                        if min <= value && value <= max {
                            println!("c gen_invariant set to: {value}");
                            cfg.gen_invariant.value = value;
                            continue 'arg_examination;
                        }
                    }
                }

                println!("gen_invariant requires a value between {min} and {max}");
                std::process::exit(1);
            }

            Some("--minimize") => {
                let (min, max) = cfg.minimize.min_max();

                if let Some(request) = split.next() {
                    if let Ok(value) = request.parse::<u8>() {
                        if min <= value && value <= max {
                            println!("c minimize set to: {value}");
                            cfg.minimize.value = value;
                            continue 'arg_examination;
                        }
                    }
                }

                println!("minimize requires a value between {min} and {max}");
                std::process::exit(1);
            }

            Some("--obl_subsumption") => {
                let (min, max) = cfg.obl_subsumption.min_max();

                if let Some(request) = split.next() {
                    if let Ok(value) = request.parse::<u8>() {
                        if min <= value && value <= max {
                            println!("c obl_subsumption set to: {value}");
                            cfg.obl_subsumption.value = value;
                            continue 'arg_examination;
                        }
                    }
                }

                println!("obl_subsumption requires a value between {min} and {max}");
                std::process::exit(1);
            }

            Some("--obl_survive") => {
                let (min, max) = cfg.obl_survive.min_max();

                if let Some(request) = split.next() {
                    if let Ok(value) = request.parse::<u8>() {
                        if min <= value && value <= max {
                            println!("c obl_survive set to: {value}");
                            cfg.obl_survive.value = value;
                            continue 'arg_examination;
                        }
                    }
                }

                println!("obl_survive requires a value between {min} and {max}");
                std::process::exit(1);
            }

            Some("--oblig_prior_stack") => {
                let (min, max) = cfg.oblig_prior_stack.min_max();

                if let Some(request) = split.next() {
                    if let Ok(value) = request.parse::<bool>() {
                        if min <= value && value <= max {
                            println!("c oblig_prior_stack set to: {value}");
                            cfg.oblig_prior_stack.value = value;
                            continue 'arg_examination;
                        }
                    }
                }

                println!("oblig_prior_stack requires a value between {min} and {max}");
                std::process::exit(1);
            }

            Some("--phaselim") => {
                if let Some(request) = split.next() {
                    if let Ok(value) = request.parse::<usize>() {
                        println!("c phaselim set to: {value}");
                        cfg.phaselim.value = value;
                        continue 'arg_examination;
                    }
                }

                println!("phaselim requires a phase count");
                std::process::exit(1);
            }

            Some("--postprocess") => {
                let (min, max) = cfg.postprocess.min_max();

                if let Some(request) = split.next() {
                    if let Ok(value) = request.parse::<bool>() {
                        if min <= value && value <= max {
                            println!("c postprocess set to: {value}");
                            cfg.postprocess.value = value;
                            continue 'arg_examination;
                        }
                    }
                }

                println!("postprocess requires a value between {min} and {max}");
                std::process::exit(1);
            }

            Some("--pphase") => {
                let (min, max) = cfg.pphase.min_max();

                if let Some(request) = split.next() {
                    if let Ok(value) = request.parse::<u8>() {
                        if min <= value && value <= max {
                            println!("c pphase set to: {value}");
                            cfg.pphase.value = value;
                            continue 'arg_examination;
                        }
                    }
                }

                println!("pphase requires a value between {min} and {max}");
                std::process::exit(1);
            }

            Some("--quick_reason") => {
                let (min, max) = cfg.quick_reason.min_max();

                if let Some(request) = split.next() {
                    if let Ok(value) = request.parse::<u8>() {
                        if min <= value && value <= max {
                            println!("c quick_reason set to: {value}");
                            cfg.quick_reason.value = value;
                            continue 'arg_examination;
                        }
                    }
                }

                println!("quick_reason requires a value between {min} and {max}");
                std::process::exit(1);
            }

            Some("--random_seed") => {
                if let Some(request) = split.next() {
                    if let Ok(value) = request.parse::<u64>() {
                        println!("c random_seed set to: {value}");
                        cfg.random_seed.value = value;
                        continue 'arg_examination;
                    }
                }

                println!("random_seed requires a 64 bit seed");
                std::process::exit(1);
            }

            Some("--resched") => {
                let (min, max) = cfg.resched.min_max();

                if let Some(request) = split.next() {
                    if let Ok(value) = request.parse::<u8>() {
                        if min <= value && value <= max {
                            println!("c resched set to: {value}");
                            cfg.resched.value = value;
                            continue 'arg_examination;
                        }
                    }
                }

                println!("resched requires a value between {min} and {max}");
                std::process::exit(1);
            }

            Some("--reverse") => {
                let (min, max) = cfg.reverse.min_max();

                if let Some(request) = split.next() {
                    if let Ok(value) = request.parse::<bool>() {
                        if min <= value && value <= max {
                            println!("c reverse set to: {value}");
                            cfg.reverse.value = value;
                            continue 'arg_examination;
                        }
                    }
                }

                println!("reverse requires a value between {min} and {max}");
                std::process::exit(1);
            }

            Some(_) | None => {
                println!("Unable to parse argument: {arg:?}");
                std::process::exit(1);
            }
        }
    }
}
