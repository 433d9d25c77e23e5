//! Page rendering. Every function here is a pure function of [`UiState`].

use crate::controller::{
    Phase, ResultView, UiState, PLACEHOLDER_TEXT, SERVER_ERROR_MESSAGE,
};
use crate::models::{display_label, normalize_label, Recipe};

const STYLE: &str = r#"
        * { margin: 0; padding: 0; box-sizing: border-box; }
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            background: linear-gradient(135deg, #f6d365 0%, #fda085 100%);
            min-height: 100vh;
            display: flex;
            justify-content: center;
            padding: 20px;
        }
        .container { background: white; border-radius: 20px; max-width: 800px; width: 100%; padding: 40px; }
        h1 { color: #333; margin-bottom: 20px; }
        .upload-box {
            border: 3px dashed #fda085;
            border-radius: 15px;
            padding: 30px;
            text-align: center;
            background: #fffaf5;
        }
        .upload-box img { max-width: 100%; border-radius: 10px; }
        .upload-text { color: #999; }
        .controls { display: flex; gap: 10px; margin-top: 20px; }
        button { padding: 10px 20px; border-radius: 20px; border: 2px solid #fda085; background: white; cursor: pointer; }
        button[disabled] { opacity: 0.5; cursor: not-allowed; }
        .loading[hidden] { display: none; }
        .notice, .error { background: #fee; color: #c33; padding: 15px; border-radius: 10px; margin-top: 20px; }
        .results { margin-top: 20px; list-style: none; }
        .prediction { display: flex; justify-content: space-between; padding: 8px 0; border-bottom: 1px solid #eee; }
        .foods, .tabs { display: flex; flex-wrap: wrap; gap: 8px; margin-top: 20px; list-style: none; }
        .active button { background: #fda085; color: white; }
        .recipe { margin-top: 20px; }
        .recipe ul, .recipe ol { margin: 10px 0 10px 20px; }
"#;

pub fn render_page(state: &UiState) -> String {
    let refresh = if state.loading {
        r#"<meta http-equiv="refresh" content="1">"#
    } else {
        ""
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    {refresh}
    <title>Food Snap</title>
    <style>{STYLE}</style>
</head>
<body data-phase="{phase}">
    <div class="container">
        <h1>🍕 What's on the plate?</h1>
        {upload}
        {controls}
        {loading}
        {notice}
        {results}
        {foods}
        {tabs}
        {recipe}
    </div>
</body>
</html>
"#,
        phase = phase_name(state.phase()),
        upload = render_upload_box(state),
        controls = render_controls(state),
        loading = render_loading(state),
        notice = render_notice(state),
        results = render_results(state),
        foods = render_food_list(state),
        tabs = render_tabs(state),
        recipe = render_recipe_panel(state),
    )
}

fn phase_name(phase: Phase) -> &'static str {
    match phase {
        Phase::Idle => "idle",
        Phase::FileSelected => "file-selected",
        Phase::Submitting => "submitting",
        Phase::ResultsShown => "results-shown",
        Phase::ErrorShown => "error-shown",
    }
}

pub fn render_upload_box(state: &UiState) -> String {
    let content = match &state.preview {
        Some(preview) => format!(
            r#"<img id="preview" src="{}" alt="{}">"#,
            escape(&preview.data_uri),
            escape(&preview.file_name)
        ),
        None => format!(
            r#"<div class="upload-icon">📸</div><p class="upload-text">{}</p>"#,
            PLACEHOLDER_TEXT
        ),
    };

    let chooser = if state.chooser_open {
        r#"<form class="chooser" method="post" action="/select" enctype="multipart/form-data">
            <input type="file" id="file-input" name="file" accept="image/*">
            <button type="submit">Preview</button>
        </form>"#
    } else {
        r#"<form method="get" action="/choose"><button type="submit" id="upload-btn">Choose image</button></form>"#
    };

    format!(r#"<div class="upload-box" id="upload-box">{content}{chooser}</div>"#)
}

fn render_controls(state: &UiState) -> String {
    let disabled = if state.submit_enabled { "" } else { " disabled" };
    format!(
        r#"<form class="controls" method="post" action="/submit"><button type="submit" id="predict-btn"{disabled}>Predict</button></form>"#
    )
}

fn render_loading(state: &UiState) -> String {
    let hidden = if state.loading { "" } else { " hidden" };
    format!(r#"<div class="loading" id="loading"{hidden}>Analyzing image...</div>"#)
}

fn render_notice(state: &UiState) -> String {
    match &state.notice {
        Some(notice) => format!(r#"<div class="notice">{}</div>"#, escape(notice)),
        None => String::new(),
    }
}

pub fn render_results(state: &UiState) -> String {
    match &state.results {
        ResultView::Empty => String::new(),
        ResultView::Rejected(message) => {
            format!(r#"<div class="error" id="result">{}</div>"#, escape(message))
        }
        ResultView::ServerError => {
            format!(r#"<div class="error" id="result">{SERVER_ERROR_MESSAGE}</div>"#)
        }
        ResultView::Predictions(predictions) => {
            let items: String = predictions
                .iter()
                .map(|p| {
                    format!(
                        r#"<li class="prediction"><span class="label">{}</span><span class="confidence">{}</span></li>"#,
                        escape(&display_label(&p.label)),
                        format_confidence(p.confidence)
                    )
                })
                .collect();
            format!(r#"<ul class="results" id="result">{items}</ul>"#)
        }
    }
}

/// `0.8734` renders as `87.34%`.
pub fn format_confidence(confidence: f64) -> String {
    format!("{:.2}%", confidence * 100.0)
}

pub fn render_food_list(state: &UiState) -> String {
    let Some(catalog) = &state.catalog else {
        return String::new();
    };
    let selected = state.selected_food.as_deref().map(normalize_label);

    let items: String = catalog
        .entries()
        .iter()
        .map(|entry| {
            let active = selected.as_deref() == Some(normalize_label(&entry.label).as_str());
            format!(
                r#"<li class="food{}"><form method="get" action="/food"><button type="submit" name="label" value="{}">{}</button></form></li>"#,
                if active { " active" } else { "" },
                escape(&entry.label),
                escape(&display_label(&entry.label))
            )
        })
        .collect();

    format!(r#"<ul class="foods" id="food-list">{items}</ul>"#)
}

/// One tab per recipe of the selected food.
pub fn render_tabs(state: &UiState) -> String {
    let Some(entry) = state.selected_entry() else {
        return String::new();
    };

    let tabs: String = entry
        .recipes
        .iter()
        .enumerate()
        .map(|(index, recipe)| {
            let active = state.selected_tab == Some(index);
            format!(
                r#"<li class="tab{}"><form method="get" action="/tab/{index}"><button type="submit">{}</button></form></li>"#,
                if active { " active" } else { "" },
                escape(&recipe.name)
            )
        })
        .collect();

    format!(r#"<ul class="tabs" id="recipe-tabs">{tabs}</ul>"#)
}

fn render_recipe_panel(state: &UiState) -> String {
    if state.selected_entry().is_none() {
        return String::new();
    }
    render_recipe(state.selected_recipe())
}

pub fn render_recipe(recipe: Option<&Recipe>) -> String {
    let Some(recipe) = recipe else {
        return r#"<div class="recipe" id="recipe-content"><p>Recipe not found.</p></div>"#
            .to_string();
    };

    let ingredients: String = recipe
        .ingredients
        .iter()
        .map(|item| format!("<li>{}</li>", escape(item)))
        .collect();
    let instructions: String = recipe
        .instructions
        .iter()
        .map(|step| format!("<li>{}</li>", escape(step)))
        .collect();

    format!(
        r#"<div class="recipe" id="recipe-content"><h3>{}</h3><h4>Ingredients</h4><ul>{ingredients}</ul><h4>Instructions</h4><ol>{instructions}</ol></div>"#,
        escape(&recipe.name)
    )
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
