use crate::usecases::u501_compress_file::CompressFileView;
use leptos::prelude::*;

#[component]
pub fn App() -> impl IntoView {
    view! {
        <CompressFileView />
    }
}
