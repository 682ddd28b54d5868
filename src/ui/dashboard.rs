//! 预测面板视图模型
//!
//! 持有页面上的全部可见状态：标签页、环形进度、状态标签、预测文本、置信度条和提交按钮

use std::fmt::Write as _;

use super::ring::ProgressRing;

/// 流失提交按钮默认文本
pub const CHURN_BUTTON_IDLE: &str = "Analyze Risk";
/// 请求进行中的按钮文本
pub const CHURN_BUTTON_BUSY: &str = "Analyzing Hub...";

const GAUGE_WIDTH: usize = 30;

/// 标签页
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Loyalty,
    Allowance,
}

impl Tab {
    pub fn title(&self) -> &'static str {
        match self {
            Tab::Loyalty => "Customer Loyalty",
            Tab::Allowance => "Allowance Eligibility",
        }
    }
}

/// 面板上的一个区块或标签按钮
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Panel {
    pub hidden: bool,
    pub active: bool,
}

#[derive(Debug, Clone)]
pub struct Dashboard {
    loyalty_section: Panel,
    allowance_section: Panel,
    ring: ProgressRing,
    percentage_text: String,
    status_text: String,
    /// 完整 class 属性，如 `status-tag low`
    status_class: String,
    prediction_text: String,
    /// 置信度条宽度，如 `30%`
    confidence_width: String,
    churn_button: String,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new(ProgressRing::default())
    }
}

impl Dashboard {
    pub fn new(ring: ProgressRing) -> Self {
        let mut dashboard = Self {
            loyalty_section: Panel {
                hidden: false,
                active: true,
            },
            allowance_section: Panel {
                hidden: true,
                active: false,
            },
            ring,
            percentage_text: "0%".to_string(),
            status_text: String::new(),
            status_class: "status-tag".to_string(),
            prediction_text: String::new(),
            confidence_width: "0%".to_string(),
            churn_button: CHURN_BUTTON_IDLE.to_string(),
        };
        dashboard.reset_display();
        dashboard
    }

    /// 切换标签页并重置展示
    pub fn show_tab(&mut self, tab: Tab) {
        self.loyalty_section.hidden = tab != Tab::Loyalty;
        self.allowance_section.hidden = tab != Tab::Allowance;
        self.loyalty_section.active = tab == Tab::Loyalty;
        self.allowance_section.active = tab == Tab::Allowance;

        self.reset_display();
    }

    fn reset_display(&mut self) {
        self.update(0.0, "Waiting for input", "Enter data to see analysis.", "moderate");
    }

    /// 更新所有展示组件
    pub fn update(&mut self, prob: f64, status_text: &str, pred_text: &str, status_class: &str) {
        self.percentage_text = format!("{}%", prob);
        self.ring.set_progress(prob);
        self.prediction_text = pred_text.to_string();
        self.status_text = status_text.to_string();
        self.status_class = format!("status-tag {}", status_class);
        self.confidence_width = format!("{}%", prob);
    }

    pub fn set_churn_button(&mut self, label: &str) {
        self.churn_button = label.to_string();
    }

    pub fn active_tab(&self) -> Tab {
        if self.allowance_section.active {
            Tab::Allowance
        } else {
            Tab::Loyalty
        }
    }

    pub fn section(&self, tab: Tab) -> &Panel {
        match tab {
            Tab::Loyalty => &self.loyalty_section,
            Tab::Allowance => &self.allowance_section,
        }
    }

    pub fn ring(&self) -> &ProgressRing {
        &self.ring
    }

    pub fn percentage_text(&self) -> &str {
        &self.percentage_text
    }

    pub fn status_text(&self) -> &str {
        &self.status_text
    }

    pub fn status_class(&self) -> &str {
        &self.status_class
    }

    pub fn prediction_text(&self) -> &str {
        &self.prediction_text
    }

    pub fn confidence_width(&self) -> &str {
        &self.confidence_width
    }

    pub fn churn_button(&self) -> &str {
        &self.churn_button
    }

    /// 渲染为终端文本
    pub fn render(&self) -> String {
        let mut out = String::new();
        let tabs = [Tab::Loyalty, Tab::Allowance]
            .iter()
            .map(|tab| {
                if self.section(*tab).active {
                    format!("[{}]", tab.title())
                } else {
                    format!(" {} ", tab.title())
                }
            })
            .collect::<Vec<_>>()
            .join(" | ");

        let _ = writeln!(out, "{}", tabs);
        let _ = writeln!(
            out,
            "  {} {:>7}  ({})",
            self.ring().render_gauge(GAUGE_WIDTH),
            self.percentage_text(),
            self.ring().color().name()
        );
        let tag_class = self
            .status_class()
            .strip_prefix("status-tag ")
            .unwrap_or(self.status_class());
        let _ = writeln!(out, "  Status:     {} <{}>", self.status_text(), tag_class);
        let _ = writeln!(out, "  Prediction: {}", self.prediction_text());
        let _ = write!(out, "  Confidence: {}", self.confidence_width());
        if self.active_tab() == Tab::Loyalty {
            let _ = write!(out, "\n  [ {} ]", self.churn_button());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_exclusive(dashboard: &Dashboard, expected: Tab) {
        let visible = [Tab::Loyalty, Tab::Allowance]
            .iter()
            .filter(|t| !dashboard.section(**t).hidden)
            .count();
        let active = [Tab::Loyalty, Tab::Allowance]
            .iter()
            .filter(|t| dashboard.section(**t).active)
            .count();
        assert_eq!(visible, 1);
        assert_eq!(active, 1);
        assert_eq!(dashboard.active_tab(), expected);
        assert!(!dashboard.section(expected).hidden);
    }

    #[test]
    fn test_show_tab_is_mutually_exclusive() {
        let mut dashboard = Dashboard::default();
        assert_exclusive(&dashboard, Tab::Loyalty);

        dashboard.show_tab(Tab::Allowance);
        assert_exclusive(&dashboard, Tab::Allowance);

        dashboard.show_tab(Tab::Loyalty);
        assert_exclusive(&dashboard, Tab::Loyalty);

        // 重复切换到同一页
        dashboard.show_tab(Tab::Loyalty);
        assert_exclusive(&dashboard, Tab::Loyalty);
    }

    #[test]
    fn test_show_tab_resets_display() {
        let mut dashboard = Dashboard::default();
        dashboard.update(88.0, "Critical Risk", "High chance of churn", "critical");

        dashboard.show_tab(Tab::Allowance);
        assert_eq!(dashboard.percentage_text(), "0%");
        assert_eq!(dashboard.status_text(), "Waiting for input");
        assert_eq!(dashboard.prediction_text(), "Enter data to see analysis.");
        assert_eq!(dashboard.status_class(), "status-tag moderate");
        assert_eq!(dashboard.confidence_width(), "0%");
        assert_eq!(dashboard.ring().offset(), dashboard.ring().circumference());
    }

    #[test]
    fn test_update_formats_probability() {
        let mut dashboard = Dashboard::default();

        dashboard.update(30.0, "Elite Score", "Approved", "low");
        assert_eq!(dashboard.percentage_text(), "30%");
        assert_eq!(dashboard.confidence_width(), "30%");
        assert_eq!(dashboard.status_class(), "status-tag low");

        dashboard.update(45.67, "Moderate Risk", "Low chance of churn", "moderate");
        assert_eq!(dashboard.percentage_text(), "45.67%");
    }

    #[test]
    fn test_render_contains_state() {
        let mut dashboard = Dashboard::default();
        dashboard.show_tab(Tab::Allowance);
        dashboard.update(30.0, "Elite Score", "Approved", "low");

        let text = dashboard.render();
        assert!(text.contains("[Allowance Eligibility]"));
        assert!(text.contains("30%"));
        assert!(text.contains("Elite Score <low>"));
        assert!(text.contains("Prediction: Approved"));
        assert!(text.contains("(success)"));
        // 按钮只属于 Loyalty 页
        assert!(!text.contains(CHURN_BUTTON_IDLE));
    }

    #[test]
    fn test_render_shows_churn_button_label() {
        let mut dashboard = Dashboard::default();
        assert!(dashboard.render().ends_with(&format!("[ {} ]", CHURN_BUTTON_IDLE)));

        dashboard.set_churn_button(CHURN_BUTTON_BUSY);
        assert!(dashboard.render().ends_with(&format!("[ {} ]", CHURN_BUTTON_BUSY)));
    }
}
