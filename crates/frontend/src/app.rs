use crate::domain::a001_bank::ui::list::BankList;
use crate::domain::a002_product::ui::list::ProductList;
use crate::shared::icons::icon;
use crate::shared::modal_stack::{ModalHost, ModalStackService};
use crate::system::pages::login::LoginPage;
use crate::system::session::{use_session, SessionContext};
use leptos::prelude::*;

/// Разделы основного макета
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Banks,
    Products,
}

impl Page {
    pub const ALL: [Page; 2] = [Page::Banks, Page::Products];

    pub fn title(&self) -> &'static str {
        match self {
            Page::Banks => "Banks",
            Page::Products => "Products",
        }
    }

    fn icon_name(&self) -> &'static str {
        match self {
            Page::Banks => "bank",
            Page::Products => "products",
        }
    }
}

#[component]
fn MainLayout() -> impl IntoView {
    let session = use_session();
    let modal_stack =
        use_context::<ModalStackService>().expect("ModalStackService not found in context");
    let (page, set_page) = signal(Page::Banks);

    let user_label = move || session.user.with(|u| u.as_ref().map(|u| u.label()).unwrap_or_default());

    let sign_out = move |_| {
        modal_stack.clear();
        session.sign_out();
    };

    view! {
        <div class="app-shell">
            <aside class="sidebar">
                <div class="sidebar__title">"Custom Fields Admin"</div>
                <nav class="sidebar__nav">
                    {Page::ALL.into_iter().map(|p| view! {
                        <button
                            class="sidebar__item"
                            class:sidebar__item--active=move || page.get() == p
                            on:click=move |_| set_page.set(p)
                        >
                            {icon(p.icon_name())}
                            <span>{p.title()}</span>
                        </button>
                    }).collect_view()}
                </nav>
                <div class="sidebar__footer">
                    <span class="sidebar__user">{user_label}</span>
                    <button class="button button--secondary" on:click=sign_out>
                        {icon("logout")}
                        " Sign out"
                    </button>
                </div>
            </aside>
            <main class="app-shell__content">
                {move || match page.get() {
                    Page::Banks => view! { <BankList /> }.into_any(),
                    Page::Products => view! { <ProductList /> }.into_any(),
                }}
            </main>
            <ModalHost />
        </div>
    }
}

#[component]
pub fn App() -> impl IntoView {
    // Сессия читается из localStorage один раз
    let session = SessionContext::restore();
    provide_context(session);
    provide_context(ModalStackService::new());

    view! {
        <Show
            when=move || session.is_signed_in()
            fallback=|| view! { <LoginPage /> }
        >
            <MainLayout />
        </Show>
    }
}
