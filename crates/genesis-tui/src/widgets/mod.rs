//! Custom widgets for the TUI

pub mod banner;
pub mod input_box;
pub mod message_list;
pub mod pipeline_panel;
pub mod retrieval_panel;
pub mod spinner;

pub use banner::ConnectivityBanner;
pub use input_box::InputBox;
pub use message_list::MessageList;
pub use pipeline_panel::PipelinePanel;
pub use retrieval_panel::RetrievalPanel;
pub use spinner::Spinner;

/// Render a widget into an off-screen buffer and return its rows as text
#[cfg(test)]
pub(crate) fn render_to_lines(widget: impl ratatui::widgets::Widget, width: u16, height: u16) -> Vec<String> {
    use ratatui::{buffer::Buffer, layout::Rect};

    let area = Rect::new(0, 0, width, height);
    let mut buf = Buffer::empty(area);
    widget.render(area, &mut buf);
    (0..height)
        .map(|y| {
            (0..width)
                .map(|x| buf[(x, y)].symbol().to_string())
                .collect::<String>()
                .trim_end()
                .to_string()
        })
        .collect()
}
