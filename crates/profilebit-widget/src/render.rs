use crate::html::escape_html;
use crate::settings::WidgetSettings;
use profilebit_core::{FormattedProgress, ProfileLinks, Result, Section};
use std::fmt::Write;

/// Placeholder emitted instead of the widget once a profile is complete and
/// the widget is set to hide itself.
pub const BLANK_MARKUP: &str = r#"<div class="profile_bit_wrapper profile_bit_wrapper--blank"></div>"#;

fn completion_class(progress: &FormattedProgress) -> &'static str {
    if progress.is_complete() {
        "bb-completed"
    } else {
        "bb-not-completed"
    }
}

fn write_ring(out: &mut String, progress: &FormattedProgress, small: bool) -> Result<()> {
    let graph_class = if small {
        "progress_bit_graph progress_bit_graph--sm"
    } else {
        "progress_bit_graph"
    };
    write!(
        out,
        r#"<div class="{}"><div class="progress-bit__ring {}" data-percentage="{}">"#,
        graph_class,
        completion_class(progress),
        progress.percentage
    )?;
    out.push_str(r#"<span class="progress-bit__left"><span class="progress-bit__disc"></span></span>"#);
    out.push_str(r#"<span class="progress-bit__right"><span class="progress-bit__disc"></span></span>"#);
    out.push_str("</div></div>");
    Ok(())
}

fn write_section(out: &mut String, settings: &WidgetSettings, section: &Section) -> Result<()> {
    let state = if section.is_complete {
        "completed"
    } else {
        "incomplete"
    };
    let not_started = if section.is_not_started() {
        " progress_not_started"
    } else {
        ""
    };
    write!(out, r#"<li class="single_section_wrap {}{}">"#, state, not_started)?;

    if settings.show_completion_icon {
        out.push_str(r#"<span class="section_number"></span>"#);
    }
    write!(
        out,
        r#"<span class="section_name"><a href="{}" class="group_link">{}</a></span>"#,
        escape_html(&section.link),
        escape_html(&section.label)
    )?;
    if settings.show_completion_status {
        // Class name matches the theme stylesheet.
        write!(
            out,
            r#"<span class="progress"><span class="completed_staus"><span class="completed_steps">{}</span>/<span class="total_steps">{}</span></span></span>"#,
            section.completed, section.total
        )?;
    }
    out.push_str("</li>");
    Ok(())
}

/// Render the widget body for already formatted progress.
///
/// Interpolated settings text, labels and links are escaped.
pub fn render_markup(
    settings: &WidgetSettings,
    progress: &FormattedProgress,
    links: &ProfileLinks,
) -> Result<String> {
    if settings.hide_when_complete && progress.is_complete() {
        return Ok(BLANK_MARKUP.to_string());
    }

    let completion_text = escape_html(&settings.completion_text);
    let mut out = String::with_capacity(2048);

    out.push_str(r#"<div class="profile_bit_wrapper"><div class="profile_bit_figure">"#);
    write!(
        out,
        r#"<div class="profile_bit skin-{} border-{}">"#,
        settings.skin.as_str(),
        settings.box_border_style.as_str()
    )?;

    out.push_str(r#"<div class="progress_container"><div class="progress_bit">"#);
    write_ring(&mut out, progress, false)?;
    write!(
        out,
        r#"<div class="progress_bit_linear"><div class="progress_bit__heading"><h3>{}</h3><i class="bb-icon-angle-right"></i></div>"#,
        escape_html(settings.linear_heading().unwrap_or_default())
    )?;
    write!(
        out,
        r#"<div class="progress_bit__line {}"><div class="progress_bit__scale" style="width: {}%"></div></div></div>"#,
        completion_class(progress),
        progress.percentage
    )?;
    write!(
        out,
        r#"<div class="progress_bit__data"><span class="progress_bit__data-num">{}<span>%</span></span><span class="progress_bit__data-remark">{}</span></div>"#,
        progress.percentage, completion_text
    )?;
    out.push_str("</div></div>");

    out.push_str(r#"<div class="profile_bit__details">"#);
    if settings.details_heading_enabled() {
        write!(
            out,
            r#"<div class="profile_bit__heading"><span class="progress-num">{}<span>%</span></span><span class="progress-figure">"#,
            progress.percentage
        )?;
        write_ring(&mut out, progress, true)?;
        write!(
            out,
            r#"</span><span class="progress-label">{}</span></div>"#,
            completion_text
        )?;
    }

    out.push_str(r#"<ul class="profile_bit__list">"#);
    for section in &progress.sections {
        write_section(&mut out, settings, section)?;
    }
    out.push_str("</ul></div></div>");

    if settings.button_enabled() {
        let text = if progress.is_complete() {
            &settings.edit_button_text
        } else {
            &settings.completion_button_text
        };
        write!(
            out,
            r#"<div class="profile_bit_action"><a class="profile_bit_action__link" href="{}">{}<i class="bb-icon-angle-right"></i></a></div>"#,
            escape_html(&links.edit_profile()),
            escape_html(text)
        )?;
    }

    out.push_str("</div></div>");
    Ok(out)
}
