use clap::Parser;
use serde_json::json;
use std::path::PathBuf;

use certificate_editor::utils::truncate_for_display;
use certificate_editor::{
    date_format, io, Certificate, CertificateOptions, Editable, InMemoryGateway,
    SUPPORTED_EXTENSION,
};

#[derive(Parser)]
#[command(name = "certificate_editor")]
#[command(about = "校验、统计并演示持久化课程证书载荷")]
#[command(version = "0.3.0")]
struct Cli {
    /// 输入证书载荷JSON文件路径（单个对象或对象数组）
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// 输出校验报告JSON文件路径
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// 显示证书统计信息
    #[arg(long)]
    stats: bool,

    /// 演示持久化：将通过校验的证书写入内存网关并展示分配的id
    #[arg(long)]
    demo_persist: bool,

    /// 构造时允许证书不携带签署人
    #[arg(long)]
    allow_empty: bool,

    /// 翻译模式：将strftime日期格式翻译为控件格式
    #[arg(long)]
    date_format: Option<String>,

    /// 静默模式(仅输出错误)
    #[arg(long)]
    quiet: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // 翻译模式不需要输入文件
    if let Some(format) = &cli.date_format {
        return handle_date_format(&cli, format);
    }

    validate_input(&cli)?;

    if cli.stats {
        return handle_stats(&cli);
    }

    if cli.demo_persist {
        return handle_demo_persist(&cli);
    }

    // 默认模式：证书校验
    handle_validation(&cli)
}

/// 验证输入文件
fn validate_input(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let input = cli
        .input
        .as_ref()
        .ok_or("该模式需要通过 --input 指定证书载荷文件")?;

    if !input.exists() {
        return Err(format!("输入文件不存在: {:?}", input).into());
    }

    let extension = input
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase());

    if extension.as_deref() != Some(SUPPORTED_EXTENSION) {
        return Err("输入文件必须是JSON文件".into());
    }

    Ok(())
}

/// 加载并构造全部证书
fn load_certificates(cli: &Cli) -> Result<Vec<Certificate>, Box<dyn std::error::Error>> {
    let input = cli.input.as_ref().ok_or("缺少输入文件")?;
    let payloads = io::load_certificate_payloads(input)?;

    let options = CertificateOptions {
        seed_default_signatory: false,
        allow_empty_children: cli.allow_empty,
    };

    let mut certificates = Vec::with_capacity(payloads.len());
    for (index, payload) in payloads.into_iter().enumerate() {
        let certificate = Certificate::new(payload, options)
            .map_err(|error| format!("第 {} 个载荷解析失败: {}", index + 1, error))?;
        certificates.push(certificate);
    }
    Ok(certificates)
}

/// 处理日期格式翻译
fn handle_date_format(cli: &Cli, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let translated = date_format::translate_directive_format(format);
    println!("{}", translated);

    if !cli.quiet {
        let today = chrono::Local::now().date_naive();
        match date_format::sample_render(format, today) {
            Some(sample) => println!("示例（今天）: {}", sample),
            None => eprintln!("警告: 格式串含无法识别的指令，无法渲染示例"),
        }
    }
    Ok(())
}

/// 处理证书校验（默认模式）
fn handle_validation(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let certificates = load_certificates(cli)?;

    let mut results = Vec::new();
    let mut valid_count = 0;

    for (index, certificate) in certificates.iter().enumerate() {
        match certificate.validate() {
            Ok(()) => {
                valid_count += 1;
                if !cli.quiet {
                    println!(
                        "[{}] {} ... 通过",
                        index + 1,
                        truncate_for_display(&certificate.attributes.name, 40)
                    );
                }
                results.push(json!({
                    "index": index + 1,
                    "name": certificate.attributes.name,
                    "valid": true,
                }));
            }
            Err(error) => {
                eprintln!(
                    "[{}] {} ... 失败: {}",
                    index + 1,
                    truncate_for_display(&certificate.attributes.name, 40),
                    error
                );
                results.push(json!({
                    "index": index + 1,
                    "name": certificate.attributes.name,
                    "valid": false,
                    "message": error.message,
                    "offending": error.offending_names(),
                }));
            }
        }
    }

    if !cli.quiet {
        println!("共 {} 个证书，{} 个通过校验", certificates.len(), valid_count);
    }

    if let Some(output) = &cli.output {
        let report = json!({
            "total": certificates.len(),
            "valid": valid_count,
            "results": results,
        });
        io::write_report(output, &report)?;
        if !cli.quiet {
            println!("报告已写入: {:?}", output);
        }
    }

    Ok(())
}

/// 处理统计信息显示
fn handle_stats(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let certificates = load_certificates(cli)?;

    for certificate in &certificates {
        println!("{}", certificate.stats());
    }
    Ok(())
}

/// 处理持久化演示
fn handle_demo_persist(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut certificates = load_certificates(cli)?;
    let gateway = InMemoryGateway::new();

    for certificate in &mut certificates {
        if let Err(error) = certificate.validate() {
            eprintln!("跳过 {}: {}", certificate.attributes.name, error);
            continue;
        }

        certificate.persist(&gateway)?;
        if !cli.quiet {
            println!(
                "{} -> id {}，状态 {}",
                certificate.attributes.name,
                certificate.id().map_or("?".to_string(), |id| id.to_string()),
                certificate.state()
            );
        }
    }

    if !cli.quiet {
        println!("网关中共存储 {} 个证书", gateway.certificate_count());
    }
    Ok(())
}
