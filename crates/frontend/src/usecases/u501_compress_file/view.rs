use contracts::usecases::common::UseCaseMetadata;
use contracts::usecases::u501_compress_file::CompressFile;
use leptos::prelude::*;
use leptos::task::spawn_local;
use wasm_bindgen::JsCast;

use super::api::BrowserPort;
use super::pipeline::{reset_session, run_compression};
use super::session::{Control, SelectedFile, Session, StatusIcon};
use crate::shared::components::ui::Button;
use crate::shared::download;
use crate::shared::icons::icon;

#[component]
pub fn CompressFileView() -> impl IntoView {
    let session = RwSignal::new(Session::new());
    let port = BrowserPort {
        file: StoredValue::new_local(None),
    };

    let has_control = move |control: Control| session.with(|s| s.has_control(control));

    // Обработка выбора файла
    let handle_file_select = move |ev: web_sys::Event| {
        let input = ev
            .target()
            .and_then(|t| t.dyn_into::<web_sys::HtmlInputElement>().ok());

        if let Some(file) = input.and_then(|i| i.files()).and_then(|files| files.get(0)) {
            let selected = SelectedFile::new(file.name(), file.size() as u64, file.type_());
            match session.try_update(|s| s.select_file(selected)) {
                Some(Ok(())) => port.file.set_value(Some(file)),
                Some(Err(e)) => log::warn!("{}", e),
                None => {}
            }
        }
    };

    let handle_compress = move |_: leptos::ev::MouseEvent| {
        spawn_local(async move {
            if let Err(e) = run_compression(&session, &port).await {
                log::warn!("{}", e);
            }
        });
    };

    let handle_cancel = move |_: leptos::ev::MouseEvent| {
        if let Some(Err(e)) = session.try_update(Session::cancel) {
            log::warn!("{}", e);
        }
        port.file.set_value(None);
    };

    let handle_reset = move |_: leptos::ev::MouseEvent| {
        if let Err(e) = reset_session(&session, &port) {
            log::warn!("{}", e);
        }
        port.file.set_value(None);
    };

    let handle_download = move |_: leptos::ev::MouseEvent| {
        let Some(artifact) = session.with_untracked(|s| s.artifact().cloned()) else {
            return;
        };
        if let Err(e) = download::trigger_download(&artifact.handle, &artifact.download_name) {
            log::error!("Download failed: {}", e);
        }
    };

    let file_name = move || session.with(|s| s.file().map(|f| f.name.clone()).unwrap_or_default());
    let file_size = move || session.with(|s| s.file().map(SelectedFile::size_label).unwrap_or_default());

    let status_view = move || {
        let message = session.with(|s| s.status_message().map(str::to_string))?;
        let status_icon = session.with(Session::status_icon);
        let modifier = match status_icon {
            StatusIcon::CheckCircle => "compressor__status--completed",
            StatusIcon::Error => "compressor__status--error",
            _ => "",
        };
        Some(view! {
            <div class=format!("compressor__status {}", modifier)>
                <span data-testid=status_icon.test_id()>{icon(status_icon.icon_name())}</span>
                <span class="compressor__status-text">{message}</span>
            </div>
        })
    };

    view! {
        <div class="compressor">
            <div class="compressor__card">
                <div class="compressor__header">
                    {icon("file-archive")}
                    <h1 class="compressor__title">{CompressFile::display_name()}</h1>
                    <p class="compressor__subtitle">{CompressFile::description()}</p>
                </div>

                <div class="compressor__body">
                    <Show when=move || has_control(Control::ChooseFile)>
                        <div>
                            <input
                                type="file"
                                id="file-upload"
                                class="hidden"
                                on:change=handle_file_select
                            />
                            <label
                                for="file-upload"
                                class="button button--primary button--block"
                                data-testid=Control::ChooseFile.test_id()
                            >
                                {icon("upload")}
                                {Control::ChooseFile.label()}
                            </label>
                        </div>
                    </Show>

                    <Show when=move || has_control(Control::CompressFile)>
                        <div>
                            <div class="compressor__fileinfo">
                                <p class="compressor__filename">{file_name}</p>
                                <p class="compressor__filesize">{file_size}</p>
                            </div>
                            <div class="compressor__actions">
                                <Button
                                    class="compressor__grow"
                                    test_id=Control::CompressFile.test_id()
                                    on_click=Callback::new(handle_compress)
                                >
                                    {icon("upload")}
                                    {Control::CompressFile.label()}
                                </Button>
                                <Button
                                    variant="outline"
                                    test_id=Control::Cancel.test_id()
                                    on_click=Callback::new(handle_cancel)
                                >
                                    {Control::Cancel.label()}
                                </Button>
                            </div>
                        </div>
                    </Show>

                    {status_view}

                    <Show when=move || has_control(Control::DownloadCompressedFile)>
                        <Button
                            block=true
                            test_id=Control::DownloadCompressedFile.test_id()
                            on_click=Callback::new(handle_download)
                        >
                            {icon("download")}
                            {Control::DownloadCompressedFile.label()}
                        </Button>
                    </Show>

                    <Show when=move || has_control(Control::CompressAnotherFile)>
                        <Button
                            variant="outline"
                            block=true
                            test_id=Control::CompressAnotherFile.test_id()
                            on_click=Callback::new(handle_reset)
                        >
                            {Control::CompressAnotherFile.label()}
                        </Button>
                    </Show>
                </div>
            </div>
        </div>
    }
}
