use yew::prelude::*;

use crate::emotion::RankedEmotions;

#[derive(Properties, PartialEq, Clone)]
pub struct EmotionResultsProps {
    pub ranked: Option<RankedEmotions>,
}

/// Primary emotion card followed by one bar per emotion, best first.
#[function_component(EmotionResults)]
pub fn emotion_results(props: &EmotionResultsProps) -> Html {
    let Some(ranked) = props.ranked.as_ref() else {
        return html! {
            <div id="emotion-results" class="emotion-results" style="display: none;"></div>
        };
    };
    let primary = ranked.primary();

    html! {
        <div id="emotion-results" class="emotion-results" style="display: block;">
            <div class="primary-emotion">
                <div id="primary-emotion-icon" class={primary.icon_class()}></div>
                <div class="primary-emotion-details">
                    <h3 id="primary-emotion-name">{primary.display_name()}</h3>
                    <div id="primary-emotion-confidence" class="primary-confidence">
                        {primary.percentage_text()}
                    </div>
                    <div class="confidence-bar">
                        <div
                            id="primary-confidence-fill"
                            class="confidence-fill"
                            style={format!("width: {}", primary.fill_width())}
                        ></div>
                    </div>
                </div>
            </div>
            <div id="all-emotions" class="all-emotions">
                { for ranked.bars().iter().map(|emotion| html! {
                    <div class="emotion-bar">
                        <div class="emotion-name">{emotion.label.clone()}</div>
                        <div class="confidence-bar">
                            <div class="confidence-fill" style={format!("width: {}", emotion.fill_width())}></div>
                        </div>
                        <div class="confidence-text">{emotion.percentage_text()}</div>
                    </div>
                }) }
            </div>
        </div>
    }
}
