//! Transactional emails sent outside campaigns.

/// A rendered email ready for [`crate::Mailer::send`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub subject: String,
    pub html: String,
}

/// First word of a display name, or the whole (trimmed) name if it has one
/// word. Empty names stay empty.
pub fn first_name(name: &str) -> &str {
    name.split_whitespace().next().unwrap_or("")
}

/// Escape text for an HTML element body or a quoted attribute.
fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

const SIGNATURE: &str = r#"<p style="color:#B8860B;font-size:16px;margin:0;">Com carinho,</p>
<p style="color:#D4AF37;font-size:18px;margin:8px 0 0;font-weight:bold;">Samira, Simone &amp; Sueli</p>
<p style="color:#888888;font-size:14px;margin:4px 0 0;">Criadoras do EMPODHERA</p>"#;

fn layout(heading: &str, body: &str, footer: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><meta name="viewport" content="width=device-width, initial-scale=1.0"></head>
<body style="margin:0;padding:0;font-family:Georgia,serif;background-color:#1A1A1A;">
<table width="100%" cellpadding="0" cellspacing="0" style="background-color:#1A1A1A;padding:40px 20px;">
<tr><td align="center">
<table width="600" cellpadding="0" cellspacing="0" style="background:#2A2A2A;border-radius:16px;border:1px solid #D4AF37;">
<tr><td style="padding:40px 40px 20px;text-align:center;">
<h1 style="color:#D4AF37;font-size:32px;margin:0;font-weight:normal;letter-spacing:2px;">EMPODHERA</h1>
</td></tr>
<tr><td style="padding:20px 40px 40px;">
<h2 style="color:#FFFFFF;font-size:24px;margin:0 0 20px;font-weight:normal;">{heading}</h2>
{body}
{SIGNATURE}
</td></tr>
<tr><td style="padding:20px 40px 30px;border-top:1px solid #333;">
<p style="color:#666666;font-size:12px;margin:0;text-align:center;">{footer}</p>
</td></tr>
</table>
</td></tr>
</table>
</body>
</html>"#
    )
}

fn paragraph(text: &str) -> String {
    format!(r#"<p style="color:#E5E5E5;font-size:16px;line-height:1.8;margin:0 0 20px;">{text}</p>"#)
}

/// Confirmation sent after someone joins the waiting list.
pub fn waiting_list_confirmation(name: &str) -> Rendered {
    let heading = format!("Olá, {}! ✨", escape_html(first_name(name)));
    let body = [
        paragraph(
            "Que alegria ter você conosco! Você agora faz parte da \
             <strong style=\"color:#D4AF37;\">lista de espera exclusiva</strong> do EMPODHERA.",
        ),
        paragraph(
            "Você será uma das primeiras a saber quando abrirmos as vagas para a \
             próxima edição do jantar.",
        ),
        paragraph("Fique de olho no seu email. Em breve você receberá novidades especiais!"),
    ]
    .concat();

    Rendered {
        subject: "Você está na lista de espera do EMPODHERA! 🎉".to_string(),
        html: layout(
            &heading,
            &body,
            "Este email foi enviado porque você se inscreveu na lista de espera do EMPODHERA.",
        ),
    }
}

/// Welcome sent after a workbook sign-up.
pub fn workbook_welcome(name: &str) -> Rendered {
    let first = first_name(name);
    let heading = format!("Olá, {}! ✨", escape_html(first));
    let body = [
        paragraph("Seu acesso ao <strong style=\"color:#D4AF37;\">Caderno de Atividades</strong> está pronto."),
        paragraph(
            "São quatro módulos para você refletir sobre autoconhecimento, talentos, \
             marca pessoal e presença digital. Suas respostas são salvas automaticamente, \
             então você pode seguir no seu ritmo.",
        ),
        paragraph("Você também entrou na nossa lista de espera e receberá as novidades do EMPODHERA."),
    ]
    .concat();

    Rendered {
        subject: format!("Bem-vinda ao Caderno de Atividades, {first}! ✨"),
        html: layout(
            &heading,
            &body,
            "Este email foi enviado porque você criou uma conta no Caderno de Atividades EMPODHERA.",
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_name_takes_the_first_word() {
        assert_eq!(first_name("Ana Paula Souza"), "Ana");
        assert_eq!(first_name("  Bia "), "Bia");
        assert_eq!(first_name(""), "");
    }

    #[test]
    fn waiting_list_greets_by_first_name() {
        let email = waiting_list_confirmation("Carla Dias");
        assert_eq!(email.subject, "Você está na lista de espera do EMPODHERA! 🎉");
        assert!(email.html.contains("Olá, Carla! ✨"));
        assert!(!email.html.contains("Dias"));
    }

    #[test]
    fn welcome_subject_uses_first_name() {
        let email = workbook_welcome("Dani Lima");
        assert_eq!(email.subject, "Bem-vinda ao Caderno de Atividades, Dani! ✨");
        assert!(email.html.contains("Caderno de Atividades"));
    }

    #[test]
    fn names_are_escaped_in_html() {
        let email = waiting_list_confirmation(r#"<img src="https://x/y">&co"#);
        assert!(!email.html.contains("<img"));
        assert!(email.html.contains("Olá, &lt;img! ✨"));

        let email = workbook_welcome(r#"Ana"&<b>"#);
        assert!(email.html.contains("Olá, Ana&quot;&amp;&lt;b&gt;! ✨"));
        assert!(!email.html.contains("<b>"));
    }
}
