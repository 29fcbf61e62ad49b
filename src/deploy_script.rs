use crate::template::{Synthesized, CERTIFICATE_ARN_OUTPUT};

pub const SITE_TEMPLATE_FILE: &str = "site.json";
pub const CERTIFICATE_TEMPLATE_FILE: &str = "certificate.json";
pub const DEPLOY_FILE: &str = "deploy.sh";

/// Writes the bash script that hands the synthesized templates to
/// cloudformation. The templates are expected next to the script.
pub fn deploy_script(synth: &Synthesized) -> String {
    let mut out = "#!/usr/bin/env bash\n\nset -euo pipefail\ncd \"$(dirname \"$0\")\"\n".to_string();

    let mut parameter_overrides = vec![];
    if let Some(cert) = &synth.certificate {
        let region = &cert.region;
        let stack_name = &cert.stack_name;
        out.push_str("\n# 1. certificate:\n");
        out.push_str(&format!(
            "AWS_REGION=\"{region}\" aws --region {region} cloudformation deploy --stack-name {stack_name} --template-file ./{CERTIFICATE_TEMPLATE_FILE} --no-fail-on-empty-changeset\n"
        ));
        out.push_str(&format!(
            "CERTIFICATE_ARN=$(aws --region {region} cloudformation describe-stacks --stack-name {stack_name} --query \"Stacks[0].Outputs[?OutputKey=='{CERTIFICATE_ARN_OUTPUT}'].OutputValue\" --output text)\n"
        ));
        for param in synth.site.template.parameters.keys() {
            parameter_overrides.push(format!("{param}=\"$CERTIFICATE_ARN\""));
        }
    }

    let region = &synth.site.region;
    let stack_name = &synth.site.stack_name;
    out.push_str("\n# 2. deploy:\n");
    let mut cmd = format!(
        "AWS_REGION=\"{region}\" aws --region {region} cloudformation deploy --stack-name {stack_name} --template-file ./{SITE_TEMPLATE_FILE} --capabilities CAPABILITY_NAMED_IAM --no-fail-on-empty-changeset"
    );
    if !parameter_overrides.is_empty() {
        cmd.push_str(" --parameter-overrides ");
        cmd.push_str(&parameter_overrides.join(" "));
    }
    out.push_str(&cmd);
    out.push('\n');

    out.push_str("\n# 3. exports:\n");
    out.push_str(&format!(
        "aws --region {region} cloudformation describe-stacks --stack-name {stack_name} --query \"Stacks[0].Outputs\" --output table\n"
    ));
    out
}
