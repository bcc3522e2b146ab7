//! Navigation shell for the clinic front end, rendered with yew.

mod nav;
#[cfg(target_arch = "wasm32")]
mod styles;

pub use nav::{format_expiry, is_active, login_error_message, sidebar_links, NavLink};

#[cfg(target_arch = "wasm32")]
mod wasm_ui {
    use std::rc::Rc;

    use crate::nav::{format_expiry, is_active, login_error_message, sidebar_links, NavLink};
    use crate::styles;
    use clinic_api::{ApiClient, HttpTransport};
    use clinic_core::{ClinicConfig, Navigation, RouteMatch, RouteTable, SessionStore};
    use clinic_wasm::{config_from_js, route_navigation, BrowserNavigator, BrowserStorage};
    use wasm_bindgen::prelude::*;
    use wasm_bindgen::JsCast;
    use web_sys::{console, Document, Element, HtmlInputElement, Window};
    use yew::events::{InputEvent, MouseEvent, SubmitEvent};
    use yew::prelude::*;
    use yew::TargetCast;

    type BrowserClient = ApiClient<BrowserStorage, HttpTransport, BrowserNavigator>;

    fn session_store(config: &ClinicConfig) -> Result<SessionStore<BrowserStorage>, String> {
        let storage = BrowserStorage::local().map_err(|err| err.to_string())?;
        Ok(SessionStore::new(storage, config))
    }

    fn api_client(config: &ClinicConfig) -> Result<BrowserClient, String> {
        Ok(ApiClient::new(
            Rc::new(session_store(config)?),
            HttpTransport::new(config),
            BrowserNavigator,
            config,
        ))
    }

    fn current_path() -> String {
        web_sys::window()
            .and_then(|window| window.location().pathname().ok())
            .unwrap_or_else(|| "/".to_string())
    }

    fn write_history(path: &str, replace: bool) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let history = match window.history() {
            Ok(history) => history,
            Err(err) => {
                console::error_1(&err);
                return;
            }
        };
        let result = if replace {
            history.replace_state_with_url(&JsValue::NULL, "", Some(path))
        } else {
            history.push_state_with_url(&JsValue::NULL, "", Some(path))
        };
        if let Err(err) = result {
            console::error_1(&err);
        }
    }

    #[derive(Properties, PartialEq)]
    pub struct ClinicAppProps {
        pub config: ClinicConfig,
    }

    #[function_component(ClinicApp)]
    fn clinic_app(props: &ClinicAppProps) -> Html {
        let config = props.config.clone();

        use_effect_with((), |_| {
            if let Some(window) = web_sys::window() {
                if let Some(document) = window.document() {
                    if let Err(err) = styles::ensure_styles(&document) {
                        console::error_1(&err);
                    }
                }
            }
            || ()
        });

        let path = use_state(current_path);
        let return_to = use_state(|| None::<String>);

        {
            let path = path.clone();
            use_effect_with((), move |_| {
                let listener = Closure::<dyn FnMut()>::new(move || path.set(current_path()));
                let window = web_sys::window();
                if let Some(window) = &window {
                    if let Err(err) = window.add_event_listener_with_callback(
                        "popstate",
                        listener.as_ref().unchecked_ref(),
                    ) {
                        console::error_1(&err);
                    }
                }
                move || {
                    if let Some(window) = window {
                        if let Err(err) = window.remove_event_listener_with_callback(
                            "popstate",
                            listener.as_ref().unchecked_ref(),
                        ) {
                            console::error_1(&err);
                        }
                    }
                }
            });
        }

        // The guard runs on every render, so a token that expired while the
        // view was open is caught on the next navigation.
        let outcome: Result<Navigation, String> = BrowserStorage::local()
            .map(|storage| route_navigation(storage, &config, &path))
            .map_err(|err| err.to_string());

        {
            let path = path.clone();
            let return_to = return_to.clone();
            use_effect_with(outcome.clone(), move |outcome| {
                if let Ok(Navigation::Redirect { to, from }) = outcome {
                    if from.is_some() {
                        return_to.set(from.clone());
                    }
                    write_history(to, true);
                    path.set(to.clone());
                }
                || ()
            });
        }

        let navigate = {
            let path = path.clone();
            Callback::from(move |to: String| {
                write_history(&to, false);
                path.set(to);
            })
        };

        let on_signed_in = {
            let navigate = navigate.clone();
            let return_to = return_to.clone();
            let home = config.home_path.clone();
            Callback::from(move |_: ()| {
                let target = (*return_to).clone().unwrap_or_else(|| home.clone());
                return_to.set(None);
                navigate.emit(target);
            })
        };

        let body = match outcome {
            Err(message) => html! { <p class="clinic-error">{ message }</p> },
            Ok(Navigation::Redirect { .. }) => html! {},
            Ok(Navigation::NotFound { path: missing }) => {
                render_not_found(&missing, &config.home_path, &navigate)
            }
            Ok(Navigation::Render(matched)) if matched.route.public => html! {
                <LoginView config={config.clone()} on_signed_in={on_signed_in} />
            },
            Ok(Navigation::Render(matched)) => html! {
                <Shell config={config.clone()} matched={matched} navigate={navigate} />
            },
        };

        html! { <div class="clinic-root">{ body }</div> }
    }

    #[derive(Properties, PartialEq)]
    struct LoginViewProps {
        config: ClinicConfig,
        on_signed_in: Callback<()>,
    }

    #[function_component(LoginView)]
    fn login_view(props: &LoginViewProps) -> Html {
        let email = use_state(String::new);
        let password = use_state(String::new);
        let error = use_state(|| None::<String>);
        let busy = use_state(|| false);

        let on_email = {
            let email = email.clone();
            Callback::from(move |event: InputEvent| {
                let input: HtmlInputElement = event.target_unchecked_into();
                email.set(input.value());
            })
        };

        let on_password = {
            let password = password.clone();
            Callback::from(move |event: InputEvent| {
                let input: HtmlInputElement = event.target_unchecked_into();
                password.set(input.value());
            })
        };

        let on_submit = {
            let config = props.config.clone();
            let on_signed_in = props.on_signed_in.clone();
            let (email, password, error, busy) =
                (email.clone(), password.clone(), error.clone(), busy.clone());
            Callback::from(move |event: SubmitEvent| {
                event.prevent_default();
                if *busy {
                    return;
                }
                let client = match api_client(&config) {
                    Ok(client) => client,
                    Err(message) => {
                        error.set(Some(message));
                        return;
                    }
                };

                busy.set(true);
                error.set(None);
                let email_value = (*email).clone();
                let password_value = (*password).clone();
                let (error, busy, on_signed_in) = (error.clone(), busy.clone(), on_signed_in.clone());
                yew::platform::spawn_local(async move {
                    match client.login(&email_value, &password_value).await {
                        Ok(_) => on_signed_in.emit(()),
                        Err(err) => error.set(Some(login_error_message(&err))),
                    }
                    busy.set(false);
                });
            })
        };

        html! {
            <form class="clinic-card" onsubmit={on_submit}>
                <h1>{"Entrar"}</h1>
                <input
                    type="email"
                    placeholder="E-mail"
                    autocomplete="username"
                    value={(*email).clone()}
                    oninput={on_email}
                    required=true
                />
                <input
                    type="password"
                    placeholder="Senha"
                    autocomplete="current-password"
                    value={(*password).clone()}
                    oninput={on_password}
                    required=true
                />
                { (*error).clone().map(|message| html! { <p class="clinic-error" role="alert">{ message }</p> }).unwrap_or_default() }
                <button type="submit" class="clinic-button" disabled={*busy}>
                    { if *busy { "Entrando..." } else { "Entrar" } }
                </button>
            </form>
        }
    }

    #[derive(Properties, PartialEq)]
    struct ShellProps {
        config: ClinicConfig,
        matched: RouteMatch,
        navigate: Callback<String>,
    }

    #[function_component(Shell)]
    fn shell(props: &ShellProps) -> Html {
        let session = session_store(&props.config).ok();
        let profile = session.as_ref().and_then(SessionStore::profile);
        let role = session.as_ref().and_then(SessionStore::resolve_role);
        let links = sidebar_links(&RouteTable::default(), role.as_deref());

        let user_label = profile
            .as_ref()
            .map(|profile| {
                if profile.full_name.is_empty() {
                    profile.email.clone()
                } else {
                    profile.full_name.clone()
                }
            })
            .filter(|label| !label.is_empty())
            .unwrap_or_else(|| "Usuário".to_string());
        let expiry = format_expiry(profile.as_ref().and_then(|profile| profile.expires_at.as_deref()));

        let on_logout = {
            let config = props.config.clone();
            let navigate = props.navigate.clone();
            Callback::from(move |_: MouseEvent| {
                match api_client(&config) {
                    Ok(client) => client.logout(),
                    Err(message) => console::error_1(&JsValue::from_str(&message)),
                }
                navigate.emit(config.login_path.clone());
            })
        };

        let matched = &props.matched;
        html! {
            <div class="clinic-shell">
                <nav class="clinic-sidebar" aria-label="Navegação principal">
                    { for links.into_iter().map(|link| render_link(link, &matched.path, &props.navigate)) }
                </nav>
                <div>
                    <header class="clinic-header">
                        <h1>{ matched.route.title.clone() }</h1>
                        <div>
                            <span class="clinic-user">
                                { user_label }
                                { role.map(|role| format!(" · {role}")).unwrap_or_default() }
                                { expiry.map(|text| format!(" · sessão até {text}")).unwrap_or_default() }
                            </span>
                            <button type="button" class="clinic-button is-ghost" onclick={on_logout}>{"Sair"}</button>
                        </div>
                    </header>
                    <main class="clinic-outlet" data-route={matched.route.pattern.clone()}>
                        {
                            for matched.params.iter().map(|(name, value)| html! {
                                <p><strong>{ format!("{name}: ") }</strong>{ value.clone() }</p>
                            })
                        }
                    </main>
                </div>
            </div>
        }
    }

    fn render_link(link: NavLink, current: &str, navigate: &Callback<String>) -> Html {
        let active = is_active(current, &link.path);
        let navigate = navigate.clone();
        let target = link.path.clone();
        let onclick = Callback::from(move |event: MouseEvent| {
            event.prevent_default();
            navigate.emit(target.clone());
        });

        html! {
            <a href={link.path} class={classes!(active.then_some("is-active"))} onclick={onclick}>
                { link.title }
            </a>
        }
    }

    fn render_not_found(path: &str, home: &str, navigate: &Callback<String>) -> Html {
        let navigate = navigate.clone();
        let home = home.to_string();
        let onclick = Callback::from(move |_: MouseEvent| navigate.emit(home.clone()));

        html! {
            <section class="clinic-card">
                <h1>{"Página não encontrada"}</h1>
                <p>{ format!("Nenhuma tela corresponde a {path}.") }</p>
                <button type="button" class="clinic-button" onclick={onclick}>{"Voltar ao início"}</button>
            </section>
        }
    }

    /// Mounts the shell on `selector`. `config` is an optional partial
    /// `ClinicConfig` object.
    #[wasm_bindgen]
    pub fn mount_clinic_app(selector: &str, config: Option<JsValue>) -> Result<(), JsValue> {
        clinic_wasm::install_panic_hook();

        let window: Window = web_sys::window().ok_or_else(|| JsValue::from_str("No window"))?;
        let document: Document = window
            .document()
            .ok_or_else(|| JsValue::from_str("No document"))?;

        let target: Element = document
            .query_selector(selector)
            .map_err(|err| JsValue::from_str(&format!("Invalid selector: {err:?}")))?
            .ok_or_else(|| JsValue::from_str("No element matches selector"))?;

        let config = config_from_js(config)?;

        yew::Renderer::<ClinicApp>::with_root_and_props(target, ClinicAppProps { config }).render();
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
pub use wasm_ui::mount_clinic_app;

#[cfg(not(target_arch = "wasm32"))]
pub fn mount_clinic_app(
    _: &str,
    _: Option<wasm_bindgen::JsValue>,
) -> Result<(), wasm_bindgen::JsValue> {
    Err(wasm_bindgen::JsValue::from_str(
        "clinic-ui only builds for the wasm32 target",
    ))
}
