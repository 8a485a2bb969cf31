use yew::prelude::*;
use yew::TargetCast;
use web_sys::{HtmlInputElement, HtmlSelectElement};

use spinwise::format::{format_money, format_percent, format_signed_money, parse_money};
use spinwise::{
    Funding, HistoryEntry, Outcome, ProgressionEngine, ProgressionMode, RiskLevel, Session,
    TrackerConfig, WinBand,
};

fn risk_class(risk: RiskLevel) -> &'static str {
    match risk {
        RiskLevel::Low => "success",
        RiskLevel::Medium => "warning",
        RiskLevel::High => "danger",
    }
}

// Colors the "safe for N losses" figure; a little stricter than the risk level.
fn safe_rounds_class(losses: u32) -> &'static str {
    if losses > 6 { "success" } else if losses >= 4 { "warning" } else { "danger" }
}

#[function_component(App)]
pub fn app() -> Html {
    // Setup inputs
    let bankroll_input = use_state(String::new);
    let base_bet_input = use_state(String::new);
    let include_green = use_state(|| false);
    let mode = use_state(|| ProgressionMode::SmartProgressive);
    let error = use_state(|| Option::<String>::None);

    let engine = use_state(|| ProgressionEngine::new(TrackerConfig::default()));

    // Handlers
    let on_bankroll_input = {
        let bankroll_input = bankroll_input.clone();
        Callback::from(move |e: InputEvent| {
            let target: HtmlInputElement = e.target_unchecked_into();
            bankroll_input.set(target.value());
        })
    };
    let on_base_bet_input = {
        let base_bet_input = base_bet_input.clone();
        Callback::from(move |e: InputEvent| {
            let target: HtmlInputElement = e.target_unchecked_into();
            base_bet_input.set(target.value());
        })
    };
    let on_green_change = {
        let include_green = include_green.clone();
        Callback::from(move |e: Event| {
            let target: HtmlInputElement = e.target_unchecked_into();
            include_green.set(target.checked());
        })
    };
    let on_mode_change = {
        let mode = mode.clone();
        Callback::from(move |e: Event| {
            let target: HtmlSelectElement = e.target_unchecked_into();
            let idx = target.selected_index().max(0) as usize;
            if let Some((m, _)) = ProgressionMode::all().get(idx) {
                mode.set(*m);
            }
        })
    };

    let on_start = {
        let engine = engine.clone();
        let error = error.clone();
        let bankroll_input = bankroll_input.clone();
        let base_bet_input = base_bet_input.clone();
        let include_green = include_green.clone();
        let mode = mode.clone();
        Callback::from(move |_| {
            let (Some(bankroll), Some(base_bet)) =
                (parse_money(&bankroll_input), parse_money(&base_bet_input))
            else {
                error.set(Some("Please enter both bankroll and initial bet amounts".into()));
                return;
            };
            let mut next = (*engine).clone();
            let started = Session::new(bankroll, base_bet, *include_green, *mode)
                .and_then(|session| next.start(session).map(|_| ()));
            match started {
                Ok(()) => {
                    error.set(None);
                    engine.set(next);
                }
                Err(err) => error.set(Some(err.into())),
            }
        })
    };

    let record = |outcome: Outcome| {
        let engine = engine.clone();
        let error = error.clone();
        Callback::from(move |_: MouseEvent| {
            let mut next = (*engine).clone();
            match next.record_result(outcome, None) {
                Ok(_) => {
                    error.set(None);
                    engine.set(next);
                }
                Err(err) => error.set(Some(err.into())),
            }
        })
    };
    let on_win = record(Outcome::Win);
    let on_loss = record(Outcome::Loss);

    let on_undo = {
        let engine = engine.clone();
        Callback::from(move |_| {
            let mut next = (*engine).clone();
            next.undo();
            engine.set(next);
        })
    };
    let on_all_in = {
        let engine = engine.clone();
        let error = error.clone();
        Callback::from(move |_| {
            let mut next = (*engine).clone();
            match next.play_with_remaining_balance() {
                Ok(_) => engine.set(next),
                Err(err) => error.set(Some(err.into())),
            }
        })
    };
    let on_add_funds = {
        let engine = engine.clone();
        let error = error.clone();
        Callback::from(move |_| {
            let mut next = (*engine).clone();
            match next.add_funds_and_continue() {
                Ok(_) => engine.set(next),
                Err(err) => error.set(Some(err.into())),
            }
        })
    };
    let on_reset = {
        let engine = engine.clone();
        let bankroll_input = bankroll_input.clone();
        let base_bet_input = base_bet_input.clone();
        let error = error.clone();
        Callback::from(move |_| {
            let mut next = (*engine).clone();
            next.reset();
            engine.set(next);
            bankroll_input.set(String::new());
            base_bet_input.set(String::new());
            error.set(None);
        })
    };

    let error_banner = match &*error {
        Some(msg) => html! { <div class="status-indicator danger" role="alert">{msg.clone()}</div> },
        None => html! {},
    };

    let body = match engine.session().copied() {
        None => {
            let bankroll_val = parse_money(&bankroll_input);
            let suggestions = bankroll_val
                .map(|b| engine.config().suggest_bets(b))
                .unwrap_or_default();
            html! {
                <div class="card">
                    <h2><span>{"Setup Your Game"}</span></h2>
                    <div class="row">
                        <div class="input-group">
                            <label>{"Total Bankroll ($)"}</label>
                            <input
                                type="text"
                                placeholder={"Enter your total money"}
                                value={(*bankroll_input).clone()}
                                oninput={on_bankroll_input}
                                aria-label="Bankroll amount" />
                        </div>
                        <div class="input-group">
                            <label>{"Initial Bet ($)"}</label>
                            <input
                                type="text"
                                placeholder={"Enter your starting bet"}
                                value={(*base_bet_input).clone()}
                                oninput={on_base_bet_input}
                                aria-label="Initial bet amount" />
                        </div>
                    </div>

                    <div class="input-group">
                        { if suggestions.is_empty() {
                            html!{ <div class="hint">{"Enter your bankroll to see suggested bet amounts"}</div> }
                        } else {
                            html!{
                                <div class="row">
                                    { for suggestions.into_iter().map(|(s, amount)| {
                                        let base_bet_input = base_bet_input.clone();
                                        let onclick = Callback::from(move |_| base_bet_input.set(format!("{:.2}", amount)));
                                        html!{
                                            <button {onclick} title={s.hint}>
                                                {format!("{}: {}", s.label, format_money(amount))}
                                            </button>
                                        }
                                    })}
                                </div>
                            }
                        }}
                    </div>

                    <div class="row" style="align-items:center;">
                        <label>
                            <input type="checkbox" checked={*include_green} onchange={on_green_change} />
                            {" Include Green (0/00)"}
                        </label>
                        <select onchange={on_mode_change} aria-label="Progression mode">
                            { for ProgressionMode::all().iter().map(|(m, name)| {
                                let selected = *m == *mode;
                                html!{ <option selected={selected}>{ *name }</option> }
                            })}
                        </select>
                    </div>

                    <div class="section-divider"></div>
                    <button onclick={on_start} style="width: 100%;">{"Start Smart Prediction"}</button>
                </div>
            }
        }
        Some(session) => {
            let state = *engine.state();
            let stats = engine.stats();
            let max_losses = engine.max_survivable_losses();
            let balance_class = if state.current_money < session.bankroll { "danger" } else { "success" };
            let profit_class = if state.total_profit >= 0.0 { "success" } else { "danger" };
            let has_history = !engine.history().is_empty();

            let actions = match engine.funding() {
                Funding::Sufficient => html! {
                    <>
                        <div class="row">
                            <button onclick={on_win}>{"Won This Round"}</button>
                            <button onclick={on_loss} class="danger">{"Lost This Round"}</button>
                        </div>
                        { if has_history {
                            html!{ <button onclick={on_undo} style="margin-top:8px; width: 100%;">{"Undo Last Round"}</button> }
                        } else { html!{} }}
                    </>
                },
                Funding::Short { balance, required, shortfall } => html! {
                    <div>
                        <h3 class="warning">{"Insufficient Funds"}</h3>
                        <div class="hint">
                            {format!("You have {} but need {} for the proper bet", format_money(balance), format_money(required))}
                        </div>
                        <div class="metric-grid">
                            <div class="metric-item">
                                <div class="metric-label">{format!("Bet your remaining {} (final round)", format_money(balance))}</div>
                                <button onclick={on_all_in} disabled={balance <= 0.0}>
                                    {format!("Bet Remaining {}", format_money(balance))}
                                </button>
                            </div>
                            <div class="metric-item">
                                <div class="metric-label">{format!("Add {} and play the proper bet of {}", format_money(shortfall), format_money(required))}</div>
                                <button onclick={on_add_funds}>
                                    {format!("Add {} & Continue", format_money(shortfall))}
                                </button>
                            </div>
                        </div>
                    </div>
                },
            };

            html! {
                <>
                    <div class="card">
                        <div class="metric-grid">
                            <div class="metric-item">
                                <div class={format!("metric-value {}", balance_class)}>{format_money(state.current_money)}</div>
                                <div class="metric-label">{"Current Balance"}</div>
                            </div>
                            <div class="metric-item">
                                <div class={format!("metric-value {}", profit_class)}>{format_money(state.total_profit)}</div>
                                <div class="metric-label">{format!("Total Profit ({})", format_percent(stats.profit_pct))}</div>
                            </div>
                            <div class="metric-item">
                                <div class={format!("metric-value {}", if state.consecutive_wins > 0 { "success" } else { "warning" })}>
                                    {state.consecutive_wins.to_string()}
                                </div>
                                <div class="metric-label">{"Win Streak"}</div>
                            </div>
                            <div class="metric-item">
                                { match stats.win_rate {
                                    Some(rate) => html!{
                                        <div class={format!("metric-value {}", if rate >= 0.5 { "success" } else { "danger" })}>
                                            {format!("{:.0}%", rate * 100.0)}
                                        </div>
                                    },
                                    None => html!{ <div class="metric-value warning">{"--"}</div> },
                                }}
                                <div class="metric-label">{format!("Win/Loss {}W / {}L", stats.wins, stats.losses)}</div>
                            </div>
                            <div class="metric-item">
                                <div class={format!("metric-value {}", risk_class(state.risk_level))}>{state.risk_level.label()}</div>
                                <div class="metric-label">{"Risk Level"}</div>
                            </div>
                        </div>
                    </div>

                    <div class="card">
                        <h2>
                            <span>{format!("Round {}", state.round)}</span>
                            <span class={format!("status-indicator {}", risk_class(state.risk_level))}>
                                {"Safe for "}<strong class={safe_rounds_class(max_losses)}>{max_losses.to_string()}</strong>{" more losses"}
                            </span>
                        </h2>
                        <div class="muted">{"Recommended Bet"}</div>
                        <div class={format!("result large color-choice {}", state.strategy_color.class())}>
                            {state.strategy_color.label()}
                        </div>
                        <div class="hint">{format!("Bet: {}", format_money(state.current_bet))}</div>

                        <div class="section-divider"></div>
                        { if session.mode.is_progressive() {
                            html!{
                                <div>
                                    <div class="muted">{"Progressive Mode"}</div>
                                    { if state.consecutive_wins > 0 {
                                        let band = WinBand::for_streak(state.consecutive_wins.saturating_add(1));
                                        html!{
                                            <div class="hint">
                                                {format!("Win streak: {} | Next bet: Smart progression. {}", state.consecutive_wins, band.description())}
                                            </div>
                                        }
                                    } else { html!{} }}
                                </div>
                            }
                        } else {
                            html!{ <div class="muted">{"Classic Martingale"}</div> }
                        }}
                        <div class="hint">{format!("Base bet: {}", format_money(session.base_bet))}</div>

                        <div class="section-divider"></div>
                        { actions }
                    </div>

                    { if has_history {
                        html!{
                            <div class="card">
                                <h2><span>{"Game History"}</span></h2>
                                { for engine.recent_history().map(history_row) }
                                { if engine.history_truncated() {
                                    html!{ <div class="hint">{format!("Showing last {} rounds", engine.config().history_display_limit)}</div> }
                                } else { html!{} }}
                            </div>
                        }
                    } else { html!{} }}

                    <button onclick={on_reset} style="margin-top:16px; width: 100%;">{"Reset Game"}</button>
                </>
            }
        }
    };

    html! {
        <div class="container">
            <header>
                <h1>{"Spinwise"}</h1>
                <div class="tooltip pill" data-tooltip="Tracks a roulette betting progression and suggests the next stake">
                    {"Progression Tracker"}
                </div>
            </header>

            { error_banner }
            { body }

            <footer>
                {"Spinwise v0.1 - Bookkeeping for betting progressions. No strategy beats the house edge."}
            </footer>
        </div>
    }
}

fn history_row(entry: &HistoryEntry) -> Html {
    let result_class = if entry.result.is_win() { "success" } else { "danger" };
    html! {
        <div class="row three" style="gap:8px; margin-bottom:6px;">
            <span>{entry.round.to_string()}</span>
            <span class={format!("strategy-tag {}", entry.strategy_color.class())}>{entry.strategy_color.label()}</span>
            <span>{format_money(entry.bet)}</span>
            <span class={result_class}>{entry.result.label()}</span>
            <span class={result_class}>{format_signed_money(entry.profit_delta)}</span>
            <span>{format_money(entry.balance_after)}</span>
        </div>
    }
}
