//! 环形进度条
//!
//! 通过 SVG stroke-dashoffset 表示百分比，颜色按阈值切换

use std::f64::consts::PI;

/// 未读取到 SVG 半径时的默认值
pub const DEFAULT_RADIUS: f64 = 80.0;

/// 环颜色
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RingColor {
    Success,
    Warning,
    Danger,
}

impl RingColor {
    /// 按百分比选择颜色：>70 危险，>40 警告，其余正常
    pub fn for_percent(percent: f64) -> Self {
        if percent > 70.0 {
            RingColor::Danger
        } else if percent > 40.0 {
            RingColor::Warning
        } else {
            RingColor::Success
        }
    }

    /// 对应的 CSS 变量
    pub fn css_var(&self) -> &'static str {
        match self {
            RingColor::Success => "var(--success)",
            RingColor::Warning => "var(--warning)",
            RingColor::Danger => "var(--danger)",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RingColor::Success => "success",
            RingColor::Warning => "warning",
            RingColor::Danger => "danger",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProgressRing {
    circumference: f64,
    offset: f64,
    color: RingColor,
}

impl Default for ProgressRing {
    fn default() -> Self {
        Self::new(DEFAULT_RADIUS)
    }
}

impl ProgressRing {
    /// 初始状态为空环（offset = 周长）
    pub fn new(radius: f64) -> Self {
        let circumference = radius * 2.0 * PI;
        Self {
            circumference,
            offset: circumference,
            color: RingColor::Success,
        }
    }

    pub fn circumference(&self) -> f64 {
        self.circumference
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn color(&self) -> RingColor {
        self.color
    }

    /// `stroke-dasharray` 取值
    pub fn dash_array(&self) -> String {
        format!("{} {}", self.circumference(), self.circumference())
    }

    /// 等价的 SVG 内联样式
    pub fn style(&self) -> String {
        format!(
            "stroke-dasharray: {}; stroke-dashoffset: {}; stroke: {}",
            self.dash_array(),
            self.offset(),
            self.color.css_var()
        )
    }

    /// 更新进度，非数值输入不做任何修改
    pub fn set_progress(&mut self, percent: f64) {
        if !percent.is_finite() {
            tracing::debug!("忽略非数值进度: {}", percent);
            return;
        }
        self.offset = self.circumference - (percent / 100.0 * self.circumference);
        self.color = RingColor::for_percent(percent);
    }

    /// 已填充比例，超出 [0, 1] 的部分被截断
    pub fn filled_ratio(&self) -> f64 {
        if self.circumference() == 0.0 {
            return 0.0;
        }
        (1.0 - self.offset() / self.circumference()).clamp(0.0, 1.0)
    }

    /// 终端文本仪表，如 `[██████░░░░░░░░░░░░░░]`
    pub fn render_gauge(&self, width: usize) -> String {
        let filled = (self.filled_ratio() * width as f64).round() as usize;
        let filled = filled.min(width);
        format!("[{}{}]", "█".repeat(filled), "░".repeat(width - filled))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_initial_offset_is_circumference() {
        let ring = ProgressRing::default();
        assert!(approx(ring.circumference(), 160.0 * PI));
        assert!(approx(ring.offset(), ring.circumference()));
    }

    #[test]
    fn test_progress_bounds() {
        let mut ring = ProgressRing::default();

        ring.set_progress(0.0);
        assert!(approx(ring.offset(), ring.circumference()));

        ring.set_progress(100.0);
        assert!(approx(ring.offset(), 0.0));

        ring.set_progress(25.0);
        assert!(approx(ring.offset(), ring.circumference() * 0.75));
    }

    #[test]
    fn test_color_thresholds() {
        let mut ring = ProgressRing::default();

        for (percent, expected) in [
            (0.0, RingColor::Success),
            (40.0, RingColor::Success),
            (40.01, RingColor::Warning),
            (70.0, RingColor::Warning),
            (70.5, RingColor::Danger),
            (100.0, RingColor::Danger),
        ] {
            ring.set_progress(percent);
            assert_eq!(ring.color(), expected, "percent = {}", percent);
        }
    }

    #[test]
    fn test_nan_is_noop() {
        let mut ring = ProgressRing::default();
        ring.set_progress(80.0);
        let before = ring.clone();

        ring.set_progress(f64::NAN);
        ring.set_progress(f64::INFINITY);
        assert_eq!(ring, before);
    }

    #[test]
    fn test_render_gauge() {
        let mut ring = ProgressRing::new(10.0);
        assert_eq!(ring.render_gauge(4), "[░░░░]");

        ring.set_progress(50.0);
        assert_eq!(ring.render_gauge(4), "[██░░]");

        // 超过 100 时截断
        ring.set_progress(150.0);
        assert_eq!(ring.render_gauge(4), "[████]");
    }

    #[test]
    fn test_style() {
        let mut ring = ProgressRing::new(10.0);
        ring.set_progress(100.0);
        let style = ring.style();
        assert!(style.contains("stroke-dashoffset: 0;"));
        assert!(style.ends_with("stroke: var(--danger)"));
        assert_eq!(RingColor::for_percent(55.0).css_var(), "var(--warning)");
    }
}
