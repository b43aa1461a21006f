use crate::shared::components::ui::Input;
use crate::system::session::{use_session, SessionUser};
use leptos::prelude::*;

/// Проверить поля формы входа и собрать пользователя
pub fn validate_login(email: &str, display_name: &str) -> Result<SessionUser, String> {
    let email = email.trim();
    if email.is_empty() {
        return Err("Email is required".to_string());
    }
    let valid = email
        .split_once('@')
        .map(|(user, domain)| !user.is_empty() && domain.contains('.') && !domain.ends_with('.'))
        .unwrap_or(false);
    if !valid {
        return Err("Enter a valid email address".to_string());
    }
    Ok(SessionUser {
        email: email.to_lowercase(),
        display_name: display_name.trim().to_string(),
    })
}

#[component]
pub fn LoginPage() -> impl IntoView {
    let session = use_session();
    let (email, set_email) = signal(String::new());
    let (display_name, set_display_name) = signal(String::new());
    let (error_message, set_error_message) = signal(Option::<String>::None);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        match validate_login(&email.get_untracked(), &display_name.get_untracked()) {
            Ok(user) => {
                set_error_message.set(None);
                // Смена пользователя переключает корень приложения на основной макет
                session.sign_in(user);
            }
            Err(e) => set_error_message.set(Some(e)),
        }
    };

    view! {
        <div class="login-container">
            <div class="login-box">
                <h1>"Custom Fields Admin"</h1>
                <h2>"Sign in"</h2>

                <Show when=move || error_message.get().is_some()>
                    <div class="error-message">
                        {move || error_message.get().unwrap_or_default()}
                    </div>
                </Show>

                <form on:submit=on_submit>
                    <Input
                        id="email"
                        label="Email"
                        input_type="email"
                        required=true
                        value=email
                        on_input=Callback::new(move |v: String| set_email.set(v))
                        placeholder="you@example.com"
                    />
                    <Input
                        id="display_name"
                        label="Display name"
                        value=display_name
                        on_input=Callback::new(move |v: String| set_display_name.set(v))
                    />
                    <button type="submit" class="button button--primary login-button">
                        "Continue"
                    </button>
                </form>
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_login() {
        assert!(validate_login("", "").is_err());
        assert!(validate_login("not-an-email", "").is_err());
        assert!(validate_login("a@b", "").is_err());

        let user = validate_login("  Ops@Example.com ", " Ops ").unwrap();
        assert_eq!(user.email, "ops@example.com");
        assert_eq!(user.display_name, "Ops");
    }
}
