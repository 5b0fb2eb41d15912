//! Yew application shell: routing, the protected-route gate, and views.
//!
//! # Design
//! - One [`SessionContext`] per boot, shared through a yew context.
//! - Core orchestrators own all state; views re-read it after each await
//!   and bump a revision counter to re-render.
//! - Navigation requested by the core goes through [`RouterNavigator`], which
//!   forwards to the yew-router navigator once the router has mounted.

use std::cell::RefCell;
use std::rc::Rc;

use gloo::console;
use web_sys::{HtmlInputElement, HtmlTextAreaElement};
use yew::prelude::*;
use yew_router::prelude::*;

use crate::core::auth::{AuthOrchestrator, LOGIN_FAILED_MESSAGE, REGISTER_FAILED_MESSAGE};
use crate::core::context::SessionContext;
use crate::core::guard::{AccessGuard, GuardState};
use crate::core::navigation::{AppRoute, NavigationMode, Navigator};
use crate::core::transport::Transport;
use crate::core::translate::TranslationOrchestrator;
use crate::services::browser::BrowserTransport;
use lingo_api_models::{LoginForm, RegisterForm, User};

mod preferences;
mod routes;

use routes::Route;

/// Core [`Navigator`] backed by the yew-router history.
#[derive(Default)]
pub(crate) struct RouterNavigator {
    inner: RefCell<Option<yew_router::navigator::Navigator>>,
}

impl RouterNavigator {
    fn attach(&self, navigator: yew_router::navigator::Navigator) {
        self.inner.replace(Some(navigator));
    }
}

impl Navigator for RouterNavigator {
    fn navigate(&self, route: AppRoute, mode: NavigationMode) {
        let Some(navigator) = self.inner.borrow().clone() else {
            console::warn!(format!("router not mounted; dropping navigation to {}", route.path()));
            return;
        };
        let target = Route::from(route);
        match mode {
            NavigationMode::Push => navigator.push(&target),
            NavigationMode::Replace => navigator.replace(&target),
        }
    }
}

/// Shared handles for every view.
#[derive(Clone)]
pub(crate) struct AppCtx {
    session: Rc<SessionContext>,
    auth: Rc<AuthOrchestrator>,
    translator: Rc<TranslationOrchestrator>,
    router: Rc<RouterNavigator>,
}

impl AppCtx {
    fn boot() -> Self {
        let config = preferences::load_config();
        let tokens = preferences::credential_store(&config);
        let transport: Rc<dyn Transport> =
            Rc::new(BrowserTransport::new(config.api_base_url.clone()));
        let router = Rc::new(RouterNavigator::default());
        let session = SessionContext::new(config, transport, tokens, router.clone());
        Self {
            auth: Rc::new(AuthOrchestrator::new(session.clone())),
            translator: Rc::new(TranslationOrchestrator::new(session.clone())),
            session,
            router,
        }
    }

    /// Drop the dashboard's translation state, then log out.
    fn sign_out(&self) {
        self.translator.reset();
        self.auth.logout();
    }
}

impl PartialEq for AppCtx {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.session, &other.session)
    }
}

fn missing_context() -> Html {
    html! { <p class="error">{"Missing application context."}</p> }
}

#[hook]
fn use_refresh() -> Callback<()> {
    let revision = use_state(|| 0_u32);
    Callback::from(move |()| revision.set(revision.wrapping_add(1)))
}

#[function_component(LingoApp)]
fn lingo_app() -> Html {
    let ctx = use_state(AppCtx::boot);
    html! {
        <ContextProvider<AppCtx> context={(*ctx).clone()}>
            <BrowserRouter>
                <RouterBridge />
                <Switch<Route> render={switch} />
            </BrowserRouter>
        </ContextProvider<AppCtx>>
    }
}

#[allow(clippy::needless_pass_by_value)]
fn switch(route: Route) -> Html {
    match route {
        Route::Login => html! { <LoginView /> },
        Route::Register => html! { <RegisterView /> },
        Route::Dashboard => html! { <ProtectedDashboard /> },
        Route::Root | Route::NotFound => html! { <Redirect<Route> to={Route::Dashboard} /> },
    }
}

#[function_component(RouterBridge)]
fn router_bridge() -> Html {
    let ctx = use_context::<AppCtx>();
    let navigator = use_navigator();
    use_effect_with_deps(
        move |_| {
            if let (Some(ctx), Some(navigator)) = (ctx, navigator) {
                ctx.router.attach(navigator);
            }
            || ()
        },
        (),
    );
    Html::default()
}

fn input_value(event: &InputEvent) -> String {
    event.target_unchecked_into::<HtmlInputElement>().value()
}

#[function_component(LoginView)]
fn login_view() -> Html {
    let ctx = use_context::<AppCtx>();
    let refresh = use_refresh();
    let username = use_state(String::new);
    let password = use_state(String::new);
    let Some(ctx) = ctx else {
        return missing_context();
    };
    let status = ctx.auth.status();

    let onsubmit = {
        let auth = ctx.auth.clone();
        let (username, password, refresh) = (username.clone(), password.clone(), refresh.clone());
        Callback::from(move |event: SubmitEvent| {
            event.prevent_default();
            let form = LoginForm {
                username: (*username).clone(),
                password: (*password).clone(),
            };
            let (auth, refresh) = (auth.clone(), refresh.clone());
            refresh.emit(());
            yew::platform::spawn_local(async move {
                auth.login(&form).await;
                refresh.emit(());
            });
        })
    };
    let on_username = {
        let username = username.clone();
        Callback::from(move |event: InputEvent| username.set(input_value(&event)))
    };
    let on_password = {
        let password = password.clone();
        Callback::from(move |event: InputEvent| password.set(input_value(&event)))
    };

    html! {
        <main class="auth">
            <h1>{"Sign in"}</h1>
            <form {onsubmit}>
                <input name="username" placeholder="Username" value={(*username).clone()} oninput={on_username} />
                <input name="password" type="password" placeholder="Password" value={(*password).clone()} oninput={on_password} />
                <button type="submit" disabled={status.pending}>
                    { if status.pending { "Signing in..." } else { "Sign in" } }
                </button>
            </form>
            if let Some(err) = status.error {
                <p class="error">{ err.display_message(LOGIN_FAILED_MESSAGE) }</p>
            }
            <Link<Route> to={Route::Register}>{"Create an account"}</Link<Route>>
        </main>
    }
}

#[function_component(RegisterView)]
fn register_view() -> Html {
    let ctx = use_context::<AppCtx>();
    let refresh = use_refresh();
    let username = use_state(String::new);
    let email = use_state(String::new);
    let password = use_state(String::new);
    let Some(ctx) = ctx else {
        return missing_context();
    };
    let status = ctx.auth.status();

    let onsubmit = {
        let auth = ctx.auth.clone();
        let (username, email, password, refresh) = (
            username.clone(),
            email.clone(),
            password.clone(),
            refresh.clone(),
        );
        Callback::from(move |event: SubmitEvent| {
            event.prevent_default();
            let form = RegisterForm {
                username: (*username).clone(),
                email: (*email).clone(),
                password: (*password).clone(),
            };
            let (auth, refresh) = (auth.clone(), refresh.clone());
            refresh.emit(());
            yew::platform::spawn_local(async move {
                auth.register(&form).await;
                refresh.emit(());
            });
        })
    };
    let bind = |handle: &UseStateHandle<String>| {
        let handle = handle.clone();
        Callback::from(move |event: InputEvent| handle.set(input_value(&event)))
    };

    html! {
        <main class="auth">
            <h1>{"Create an account"}</h1>
            <form {onsubmit}>
                <input name="username" placeholder="Username" value={(*username).clone()} oninput={bind(&username)} />
                <input name="email" type="email" placeholder="Email" value={(*email).clone()} oninput={bind(&email)} />
                <input name="password" type="password" placeholder="Password" value={(*password).clone()} oninput={bind(&password)} />
                <button type="submit" disabled={status.pending}>{"Register"}</button>
            </form>
            if let Some(err) = status.error {
                <p class="error">{ err.display_message(REGISTER_FAILED_MESSAGE) }</p>
            }
            <Link<Route> to={Route::Login}>{"Back to sign in"}</Link<Route>>
        </main>
    }
}

#[function_component(ProtectedDashboard)]
fn protected_dashboard() -> Html {
    let ctx = use_context::<AppCtx>();
    let refresh = use_refresh();
    {
        let refresh = refresh.clone();
        use_effect_with_deps(
            move |ctx: &Option<AppCtx>| {
                if let Some(ctx) = ctx.clone() {
                    yew::platform::spawn_local(async move {
                        ctx.auth.current_user().await;
                        AccessGuard::enforce(ctx.session.cache(), ctx.session.navigator());
                        refresh.emit(());
                    });
                }
                || ()
            },
            ctx.clone(),
        );
    }
    let Some(ctx) = ctx else {
        return missing_context();
    };

    match AccessGuard::evaluate(ctx.session.cache()) {
        GuardState::Pending => html! { <p class="loading">{"Loading..."}</p> },
        GuardState::Unauthenticated => Html::default(),
        GuardState::Authenticated(user) => html! { <DashboardView {user} /> },
    }
}

#[derive(Properties, PartialEq)]
struct DashboardProps {
    user: User,
}

#[function_component(DashboardView)]
fn dashboard_view(props: &DashboardProps) -> Html {
    let ctx = use_context::<AppCtx>();
    let refresh = use_refresh();
    let Some(ctx) = ctx else {
        return missing_context();
    };
    let translator = ctx.translator.clone();
    let inputs = translator.inputs();
    let status = translator.status();

    let logout = {
        let ctx = ctx.clone();
        Callback::from(move |_: MouseEvent| ctx.sign_out())
    };
    let toggle_batch = {
        let (translator, refresh) = (translator.clone(), refresh.clone());
        Callback::from(move |event: Event| {
            let on = event.target_unchecked_into::<HtmlInputElement>().checked();
            let discarded = translator.edit(|inputs| inputs.set_mode(on));
            if discarded > 0 {
                console::warn!(format!("batch mode off: discarded {discarded} inputs"));
            }
            refresh.emit(());
        })
    };
    let add_input = {
        let (translator, refresh) = (translator.clone(), refresh.clone());
        Callback::from(move |_: MouseEvent| {
            translator.edit(|inputs| inputs.add_input());
            refresh.emit(());
        })
    };
    let translate = {
        let (translator, refresh) = (translator.clone(), refresh.clone());
        Callback::from(move |_: MouseEvent| {
            let (translator, refresh) = (translator.clone(), refresh.clone());
            refresh.emit(());
            yew::platform::spawn_local(async move {
                translator.translate().await;
                refresh.emit(());
            });
        })
    };
    let show_viz = translator.last_viz_url().map(|url| {
        let (translator, refresh) = (translator.clone(), refresh.clone());
        Callback::from(move |_: MouseEvent| {
            let (translator, refresh, url) = (translator.clone(), refresh.clone(), url.clone());
            yew::platform::spawn_local(async move {
                translator.fetch_visualization(&url).await;
                refresh.emit(());
            });
        })
    });

    let viz = translator.viz_status().value().cloned();

    let rows = inputs.inputs().iter().enumerate().map(|(index, text)| {
        let on_edit = {
            let (translator, refresh) = (translator.clone(), refresh.clone());
            Callback::from(move |event: InputEvent| {
                let value = event.target_unchecked_into::<HtmlTextAreaElement>().value();
                translator.edit(|inputs| inputs.update_input(index, value));
                refresh.emit(());
            })
        };
        let on_remove = {
            let (translator, refresh) = (translator.clone(), refresh.clone());
            Callback::from(move |_: MouseEvent| {
                translator.edit(|inputs| inputs.remove_input(index));
                refresh.emit(());
            })
        };
        let result = inputs.results().get(index).map(|result| {
            let class = if result.is_failure() { "result error" } else { "result" };
            html! { <p {class}>{ result.text() }</p> }
        });
        html! {
            <li key={index}>
                <textarea value={text.clone()} oninput={on_edit} />
                if inputs.is_batch_mode() && inputs.inputs().len() > 1 {
                    <button onclick={on_remove}>{"Remove"}</button>
                }
                { for result }
            </li>
        }
    });

    html! {
        <main class="dashboard">
            <header>
                <h1>{"Dashboard"}</h1>
                <button onclick={logout}>{"Sign out"}</button>
            </header>
            <p>{ format!("Hello, {}", props.user.username) }</p>
            <p class="muted">{ props.user.email.clone() }</p>
            <label>
                <input type="checkbox" checked={inputs.is_batch_mode()} onchange={toggle_batch} />
                {"Batch mode"}
            </label>
            <ol>{ for rows }</ol>
            if inputs.is_batch_mode() {
                <button onclick={add_input}>{"Add input"}</button>
            }
            <button onclick={translate} disabled={status.pending}>
                { if status.pending { "Translating..." } else { "Translate" } }
            </button>
            if let Some(onclick) = show_viz {
                <button {onclick}>{"Show attention"}</button>
            }
            if let Some(srcdoc) = viz {
                <iframe class="viz" {srcdoc} />
            }
        </main>
    }
}

/// Mount the application into the document body.
pub fn run_app() {
    console_error_panic_hook::set_once();
    yew::Renderer::<LingoApp>::new().render();
}
